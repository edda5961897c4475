//! Configuration for the Lumen core layer.
//!
//! The shell reads `config.toml` from the platform configuration directory.
//! Missing files and missing fields fall back to compiled-in defaults; an
//! unparsable or invalid file is an error.

pub mod defaults;
mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CoreConfig, LoggingConfig};
