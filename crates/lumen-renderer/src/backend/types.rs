use bitflags::bitflags;

/// Buffer binding point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Update frequency hint for buffer storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

/// Primitive assembly mode for draw submission.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    LineList,
    LineStrip,
    PointList,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

/// How the backend must interpret an attribute's data.
///
/// Each class maps to a distinct attribute-pointer entry point on stateful
/// backends (normalized fixed-point, float, 64-bit float, integer).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttributeClass {
    Normalized,
    Float,
    Double,
    Integer,
}

/// One vertex attribute declaration issued while building a vertex layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttributeBinding {
    /// Attribute slot in the program.
    pub index: u32,
    pub format: wgpu::VertexFormat,
    pub class: AttributeClass,
    /// Number of scalar components (1..=4).
    pub components: u32,
    /// Byte distance between consecutive elements.
    pub stride: u32,
    /// Byte offset from the start of the bound buffer.
    pub offset: u64,
    /// Per-vertex or per-instance advance rate.
    pub step: wgpu::VertexStepMode,
}

bitflags! {
    /// Buffers touched by a clear.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u8 {
        const COLOR   = 1 << 0;
        const DEPTH   = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Condition under which a conditional-render block executes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QueryCondition {
    NoWait,
    RegionNoWait,
    RegionWait,
    Wait,
}
