// Core domain layer
pub mod extractor;
pub mod graph;
pub mod interfaces;
pub mod models;
pub mod resolver;
pub mod services;

pub use extractor::*;
pub use graph::*;
pub use interfaces::*;
pub use models::*;
pub use resolver::*;
pub use services::*;
