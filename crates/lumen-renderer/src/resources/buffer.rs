use crate::backend::BufferId;

use super::{Handle, VertexLayout};

/// Vertex data living in a backend buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    pub buffer: BufferId,
    /// Byte offset of the first vertex inside `buffer`.
    pub start_offset: u64,
    pub vertex_count: u32,
    pub layout: Handle<VertexLayout>,
    /// Whether the data is backend-resident. Only hardware buffers can be bound.
    pub hardware: bool,
}

impl VertexBuffer {
    #[inline]
    pub fn new(buffer: BufferId, layout: Handle<VertexLayout>, vertex_count: u32) -> Self {
        Self {
            buffer,
            start_offset: 0,
            vertex_count,
            layout,
            hardware: true,
        }
    }
}

/// Index data living in a backend buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBuffer {
    pub buffer: BufferId,
    pub start_offset: u64,
    pub index_count: u32,
    /// 32-bit indices when set, 16-bit otherwise.
    pub large_indices: bool,
    pub hardware: bool,
}

impl IndexBuffer {
    #[inline]
    pub fn new(buffer: BufferId, index_count: u32, large_indices: bool) -> Self {
        Self {
            buffer,
            start_offset: 0,
            index_count,
            large_indices,
            hardware: true,
        }
    }

    #[inline]
    pub fn index_format(&self) -> wgpu::IndexFormat {
        if self.large_indices {
            wgpu::IndexFormat::Uint32
        } else {
            wgpu::IndexFormat::Uint16
        }
    }

    /// Size of one index in bytes.
    #[inline]
    pub fn index_size(&self) -> u64 {
        if self.large_indices { 4 } else { 2 }
    }
}
