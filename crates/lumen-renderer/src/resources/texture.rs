use crate::backend::TextureId;

/// Texture binding target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureKind {
    D2,
    D3,
    Cubemap,
    D2Array,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub texture: TextureId,
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub has_mipmaps: bool,
}

impl Texture {
    /// Plain 2D texture without mipmaps.
    pub fn new_2d(texture: TextureId, width: u32, height: u32) -> Self {
        Self {
            texture,
            kind: TextureKind::D2,
            width,
            height,
            depth: 1,
            has_mipmaps: false,
        }
    }

    #[inline]
    pub fn with_mipmaps(mut self, has_mipmaps: bool) -> Self {
        self.has_mipmaps = has_mipmaps;
        self
    }
}
