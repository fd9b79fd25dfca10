use thiserror::Error;

use super::ContextId;

/// Failure reported by a backend primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend startup failed: {0}")]
    Startup(String),

    #[error("out of memory while allocating {0}")]
    OutOfMemory(&'static str),

    #[error("program creation failed: {0}")]
    Program(String),

    #[error("context {0:?} cannot be made current")]
    Context(ContextId),
}
