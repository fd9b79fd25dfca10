use crate::resources::{Handle, IndexBuffer, ResourceId, VertexBuffer, VertexLayout};

/// Identity of a composite vertex-layout object.
///
/// Compared by handle, never by content: two layouts with identical
/// components are still distinct keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaoKey {
    pub index_buffer: Option<Handle<IndexBuffer>>,
    pub vertex_buffer: Handle<VertexBuffer>,
    pub layout: Handle<VertexLayout>,
    /// Per-instance layout, present only while instancing.
    pub instancing: Option<Handle<VertexLayout>>,
}

impl VaoKey {
    /// Resources whose release must evict this key (up to four).
    pub fn resources(&self) -> impl Iterator<Item = ResourceId> {
        [
            self.index_buffer.map(ResourceId::from),
            Some(ResourceId::from(self.vertex_buffer)),
            Some(ResourceId::from(self.layout)),
            self.instancing.map(ResourceId::from),
        ]
        .into_iter()
        .flatten()
    }
}
