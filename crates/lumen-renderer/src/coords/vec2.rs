/// 2D float vector, used for target-size uniforms.
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Builds a vector from integer pixel dimensions.
    #[inline]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// Component-wise reciprocal. Zero components become infinite.
    #[inline]
    pub fn recip(self) -> Self {
        Self::new(self.x.recip(), self.y.recip())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recip_of_size() {
        let v = Vec2::from_size(800, 400).recip();
        assert_eq!(v, Vec2::new(1.0 / 800.0, 1.0 / 400.0));
    }

    #[test]
    fn recip_of_zero_is_infinite() {
        let v = Vec2::new(0.0, 4.0).recip();
        assert_eq!(v.x, f32::INFINITY);
        assert_eq!(v.y, 0.25);
    }
}
