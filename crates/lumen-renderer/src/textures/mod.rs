//! Texture units and samplers.

mod sampler;
mod table;

pub use sampler::{SamplerFilter, TextureSampler};
pub use table::TextureUnitTable;
