//! Lumen renderer crate.
//!
//! Tracks transform matrices, shader/texture/buffer bindings and composite
//! vertex-layout objects, and synchronizes them to a stateful graphics backend
//! right before each draw.

pub mod backend;
pub mod caps;
pub mod coords;
pub mod logging;
pub mod matrix;
pub mod renderer;
pub mod resources;
pub mod states;
pub mod textures;
pub mod vao;

pub use renderer::{ErrorKind, RenderError, Renderer, RendererConfig};
