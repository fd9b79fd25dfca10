/// Semantic slot of a vertex attribute.
///
/// The discriminant is the backend attribute index. Per-vertex components come
/// first, per-instance components last.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum VertexComponent {
    Position = 0,
    Normal,
    Tangent,
    Color,
    TexCoord,
    Userdata0,
    Userdata1,
    Userdata2,
    Userdata3,
    InstanceData0,
    InstanceData1,
    InstanceData2,
    InstanceData3,
    InstanceData4,
    InstanceData5,
}

impl VertexComponent {
    pub const COUNT: usize = 15;

    pub const ALL: [VertexComponent; Self::COUNT] = [
        VertexComponent::Position,
        VertexComponent::Normal,
        VertexComponent::Tangent,
        VertexComponent::Color,
        VertexComponent::TexCoord,
        VertexComponent::Userdata0,
        VertexComponent::Userdata1,
        VertexComponent::Userdata2,
        VertexComponent::Userdata3,
        VertexComponent::InstanceData0,
        VertexComponent::InstanceData1,
        VertexComponent::InstanceData2,
        VertexComponent::InstanceData3,
        VertexComponent::InstanceData4,
        VertexComponent::InstanceData5,
    ];

    /// Components read from the vertex buffer.
    pub const VERTEX_DATA: [VertexComponent; 9] = [
        VertexComponent::Position,
        VertexComponent::Normal,
        VertexComponent::Tangent,
        VertexComponent::Color,
        VertexComponent::TexCoord,
        VertexComponent::Userdata0,
        VertexComponent::Userdata1,
        VertexComponent::Userdata2,
        VertexComponent::Userdata3,
    ];

    /// Components read from the instance buffer.
    pub const INSTANCE_DATA: [VertexComponent; 6] = [
        VertexComponent::InstanceData0,
        VertexComponent::InstanceData1,
        VertexComponent::InstanceData2,
        VertexComponent::InstanceData3,
        VertexComponent::InstanceData4,
        VertexComponent::InstanceData5,
    ];

    #[inline]
    pub const fn attribute_index(self) -> u32 {
        self as u32
    }

    #[inline]
    pub fn is_instance_data(self) -> bool {
        self >= VertexComponent::InstanceData0
    }
}

/// Placement of one component inside a vertex.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayoutEntry {
    pub format: wgpu::VertexFormat,
    pub offset: u64,
}

/// Vertex declaration: which components a vertex carries, their formats and offsets.
///
/// Layouts are registered once and referenced by handle; the vertex-layout cache
/// keys on that handle, not on the content.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    entries: [Option<LayoutEntry>; VertexComponent::COUNT],
    stride: u32,
}

impl VertexLayout {
    /// Packs the given components tightly in declaration order.
    pub fn new(components: &[(VertexComponent, wgpu::VertexFormat)]) -> Self {
        let mut entries = [None; VertexComponent::COUNT];
        let mut offset = 0u64;

        for &(component, format) in components {
            entries[component as usize] = Some(LayoutEntry { format, offset });
            offset += format.size();
        }

        Self {
            entries,
            stride: offset as u32,
        }
    }

    /// Two-float clip-space positions. Used by the full-screen quad.
    pub fn xy() -> Self {
        Self::new(&[(VertexComponent::Position, wgpu::VertexFormat::Float32x2)])
    }

    #[inline]
    pub fn component(&self, component: VertexComponent) -> Option<LayoutEntry> {
        self.entries[component as usize]
    }

    #[inline]
    pub fn is_enabled(&self, component: VertexComponent) -> bool {
        self.entries[component as usize].is_some()
    }

    /// Byte distance between consecutive vertices.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Enabled components in attribute-index order.
    pub fn enabled(&self) -> impl Iterator<Item = (VertexComponent, LayoutEntry)> + '_ {
        VertexComponent::ALL
            .iter()
            .zip(self.entries.iter())
            .filter_map(|(c, e)| e.map(|e| (*c, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::VertexFormat;

    #[test]
    fn packs_offsets_in_order() {
        let layout = VertexLayout::new(&[
            (VertexComponent::Position, VertexFormat::Float32x3),
            (VertexComponent::Color, VertexFormat::Unorm8x4),
            (VertexComponent::TexCoord, VertexFormat::Float32x2),
        ]);

        assert_eq!(layout.stride(), 12 + 4 + 8);
        assert_eq!(layout.component(VertexComponent::Color).map(|e| e.offset), Some(12));
        assert_eq!(layout.component(VertexComponent::TexCoord).map(|e| e.offset), Some(16));
        assert!(!layout.is_enabled(VertexComponent::Normal));
    }

    #[test]
    fn enabled_iterates_by_attribute_index() {
        let layout = VertexLayout::new(&[
            (VertexComponent::TexCoord, VertexFormat::Float32x2),
            (VertexComponent::Position, VertexFormat::Float32x2),
        ]);
        let order: Vec<_> = layout.enabled().map(|(c, _)| c).collect();
        assert_eq!(order, vec![VertexComponent::Position, VertexComponent::TexCoord]);
    }

    #[test]
    fn component_groups_split_at_instance_data() {
        assert_eq!(VertexComponent::VERTEX_DATA.len(), 9);
        assert_eq!(VertexComponent::INSTANCE_DATA.len(), 6);
        assert!(VertexComponent::INSTANCE_DATA.iter().all(|c| c.is_instance_data()));
        assert!(!VertexComponent::Userdata3.is_instance_data());
        assert_eq!(VertexComponent::InstanceData0.attribute_index(), 9);
    }

    #[test]
    fn xy_layout() {
        let xy = VertexLayout::xy();
        assert_eq!(xy.stride(), 8);
        assert!(xy.is_enabled(VertexComponent::Position));
    }
}
