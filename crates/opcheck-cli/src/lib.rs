//! Library side of the `opcheck` binary: argument parsing, configuration
//! loading, input discovery and diagnostic rendering.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
