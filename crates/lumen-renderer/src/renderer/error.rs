use thiserror::Error;

use crate::backend::BackendError;
use crate::caps::Capabilities;
use crate::resources::VertexComponent;

/// Category of a [`RenderError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required state missing (no context, shader, target, buffer).
    Precondition,
    /// The backend lacks a required capability.
    Unsupported,
    /// A resource is stale or not usable as bound.
    InvalidResource,
    InvalidArgument,
    /// A vertex attribute format the backend cannot read; the layout entry was evicted.
    UnsupportedAttribute,
    Backend,
}

/// Recoverable renderer failure.
///
/// Returned before any backend command is issued for the failing call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("renderer is not initialized")]
    NotInitialized,

    #[error("no active graphics context")]
    NoContext,

    #[error("no shader bound")]
    NoShader,

    #[error("no render target bound")]
    NoTarget,

    #[error("no vertex buffer bound")]
    NoVertexBuffer,

    #[error("no index buffer bound")]
    NoIndexBuffer,

    #[error("no instancing layout set")]
    NoInstanceLayout,

    #[error("unsupported capability: {0:?}")]
    Unsupported(Capabilities),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("instance count {count} exceeds instance buffer capacity {capacity}")]
    InstanceOverflow { count: u32, capacity: u32 },

    #[error("vertex component {component:?} has unsupported format {format:?}")]
    UnsupportedAttribute {
        component: VertexComponent,
        format: wgpu::VertexFormat,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::NotInitialized
            | RenderError::NoContext
            | RenderError::NoShader
            | RenderError::NoTarget
            | RenderError::NoVertexBuffer
            | RenderError::NoIndexBuffer
            | RenderError::NoInstanceLayout => ErrorKind::Precondition,
            RenderError::Unsupported(_) => ErrorKind::Unsupported,
            RenderError::InvalidResource(_) => ErrorKind::InvalidResource,
            RenderError::InvalidArgument(_) | RenderError::InstanceOverflow { .. } => {
                ErrorKind::InvalidArgument
            }
            RenderError::UnsupportedAttribute { .. } => ErrorKind::UnsupportedAttribute,
            RenderError::Backend(_) => ErrorKind::Backend,
        }
    }
}

/// Logs `err` through the `log` facade and hands it back.
pub(crate) fn report(operation: &str, err: RenderError) -> RenderError {
    log::error!("{operation}: {err} ({:?})", err.kind());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(RenderError::NoShader.kind(), ErrorKind::Precondition);
        assert_eq!(
            RenderError::Unsupported(Capabilities::INSTANCING).kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            RenderError::InstanceOverflow { count: 9, capacity: 8 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            RenderError::from(BackendError::OutOfMemory("buffer")).kind(),
            ErrorKind::Backend
        );
    }

    #[test]
    fn messages() {
        assert_eq!(RenderError::NoShader.to_string(), "no shader bound");
        assert_eq!(
            RenderError::InstanceOverflow { count: 9, capacity: 8 }.to_string(),
            "instance count 9 exceeds instance buffer capacity 8"
        );
    }
}
