/// Integer rectangle in framebuffer pixels, used for scissor and viewport boxes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin covering `width x height`.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_size_is_anchored_at_origin() {
        assert_eq!(Rect::from_size(640, 480), Rect::new(0, 0, 640, 480));
    }
}
