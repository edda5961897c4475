//! Foundation layer for the Lumen shell.
//!
//! `lumen-core` provides the infrastructure the rest of the shell builds on:
//! error types, logging initialization, configuration loading and the
//! geometric primitives shared by the render manager and its engines.
//!
//! Nothing in this crate knows about windows, actors or compositing; it is
//! deliberately free of policy so that it can be tested in isolation.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, CoreConfig, LoggingConfig};
pub use error::{ConfigError, CoreError, LoggingError};
