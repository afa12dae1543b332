// kumi - ES module bundler
// Layered like the binary: core domain, infrastructure adapters, shared utils, CLI

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod utils;
