use crate::backend::{ContextId, FramebufferId};

/// Something draw calls can land in: a window surface or an offscreen framebuffer.
///
/// A target with its own context makes that context current when activated.
/// A target without one renders in whatever context is already current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub width: u32,
    pub height: u32,
    pub renderable: bool,
    pub context: Option<ContextId>,
    /// `None` renders to the context's default framebuffer.
    pub framebuffer: Option<FramebufferId>,
}

impl RenderTarget {
    /// Default framebuffer of `context`.
    pub fn window(context: ContextId, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            renderable: true,
            context: Some(context),
            framebuffer: None,
        }
    }

    /// Offscreen framebuffer rendered from the current context.
    pub fn offscreen(framebuffer: FramebufferId, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            renderable: true,
            context: None,
            framebuffer: Some(framebuffer),
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
