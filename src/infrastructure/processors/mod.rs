// Processors module
pub mod bundle_emitter;
pub mod module_transformer;

pub use bundle_emitter::*;
pub use module_transformer::*;
