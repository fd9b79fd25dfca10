//! Composite vertex-layout objects.
//!
//! Responsibilities:
//! - classify vertex formats and declare attributes on the backend
//! - cache one vertex array per (context, key) with release-driven eviction
//! - defer deletes until the owning context is current

mod attributes;
mod cache;
mod key;

pub use attributes::{classify, declare_attributes, VertexSource};
pub use cache::{Lookup, VaoCache};
pub use key::VaoKey;
