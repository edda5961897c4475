//! Error types for the system layer.

use lumen_core::error::CoreError;
use thiserror::Error;

/// Errors surfaced by the system layer.
///
/// Most of the render manager's operations deliberately do not fail (see the
/// error policy: invalid state changes are logged and ignored, X errors are
/// trapped); this type covers the paths that genuinely can, such as startup
/// and configuration loading.
#[derive(Error, Debug)]
pub enum SystemError {
    /// A core-layer failure (configuration, logging, I/O).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The transitions configuration could not be loaded.
    #[error("transitions configuration error: {0}")]
    TransitionConfig(String),

    /// The event loop could not be constructed or driven.
    #[error("event loop error: {0}")]
    EventLoop(String),
}
