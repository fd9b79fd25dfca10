//! Transform matrices tracked by the renderer.
//!
//! Three base slots (projection, view, world) feed three products and six
//! inverses. See [`MatrixKind::derivation`] for the graph.

mod cache;
mod kind;

pub use cache::{MatrixCache, MatrixSlot};
pub use kind::{Derivation, MatrixKind};
