//! Coordinate and geometry types shared across the renderer.
//!
//! - `Rect`: integer framebuffer rectangles (scissor, viewport)
//! - `Vec2`: float pairs sent as target-size uniforms
//! - `Matrix4`: row-major transforms tracked by the matrix cache
//! - `ColorRgba`: clear colors

mod color;
mod matrix;
mod rect;
mod vec2;

pub use color::ColorRgba;
pub use matrix::Matrix4;
pub use rect::Rect;
pub use vec2::Vec2;
