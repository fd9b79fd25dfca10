use crate::backend::{AttributeBinding, AttributeClass, Backend, BufferId, BufferKind};
use crate::caps::CapabilityTable;
use crate::renderer::RenderError;
use crate::resources::{VertexComponent, VertexLayout};

/// Data class and component count of a vertex format, `None` if unsupported.
pub fn classify(format: wgpu::VertexFormat) -> Option<(AttributeClass, u32)> {
    use wgpu::VertexFormat as F;

    let out = match format {
        F::Unorm8x4 => (AttributeClass::Normalized, 4),

        F::Float32 => (AttributeClass::Float, 1),
        F::Float32x2 => (AttributeClass::Float, 2),
        F::Float32x3 => (AttributeClass::Float, 3),
        F::Float32x4 => (AttributeClass::Float, 4),

        F::Float64 => (AttributeClass::Double, 1),
        F::Float64x2 => (AttributeClass::Double, 2),
        F::Float64x3 => (AttributeClass::Double, 3),
        F::Float64x4 => (AttributeClass::Double, 4),

        F::Sint32 | F::Uint32 => (AttributeClass::Integer, 1),
        F::Sint32x2 | F::Uint32x2 => (AttributeClass::Integer, 2),
        F::Sint32x3 | F::Uint32x3 => (AttributeClass::Integer, 3),
        F::Sint32x4 | F::Uint32x4 => (AttributeClass::Integer, 4),

        _ => return None,
    };
    Some(out)
}

/// A buffer plus the layout describing its elements.
#[derive(Debug, Copy, Clone)]
pub struct VertexSource<'a> {
    pub buffer: BufferId,
    pub start_offset: u64,
    pub layout: &'a VertexLayout,
}

fn declare_source<B: Backend>(
    backend: &mut B,
    caps: &CapabilityTable,
    source: VertexSource<'_>,
    components: &[VertexComponent],
    step: wgpu::VertexStepMode,
) -> Result<(), RenderError> {
    backend.bind_buffer(BufferKind::Vertex, Some(source.buffer));
    let stride = source.layout.stride();

    for &component in components {
        let Some(entry) = source.layout.component(component) else {
            backend.disable_attribute(component.attribute_index());
            continue;
        };

        let Some((class, count)) =
            classify(entry.format).filter(|(class, _)| caps.supports_attribute_class(*class))
        else {
            return Err(RenderError::UnsupportedAttribute {
                component,
                format: entry.format,
            });
        };

        backend.enable_attribute(&AttributeBinding {
            index: component.attribute_index(),
            format: entry.format,
            class,
            components: count,
            stride,
            offset: source.start_offset + entry.offset,
            step,
        });
    }
    Ok(())
}

/// Declares every attribute of `vertices` (and `instances`, when instancing) on the
/// bound vertex array, then binds the index buffer.
///
/// Stops at the first attribute the backend cannot read.
pub fn declare_attributes<B: Backend>(
    backend: &mut B,
    caps: &CapabilityTable,
    vertices: VertexSource<'_>,
    instances: Option<VertexSource<'_>>,
    index_buffer: Option<BufferId>,
) -> Result<(), RenderError> {
    declare_source(
        backend,
        caps,
        vertices,
        &VertexComponent::VERTEX_DATA,
        wgpu::VertexStepMode::Vertex,
    )?;

    match instances {
        Some(source) => declare_source(
            backend,
            caps,
            source,
            &VertexComponent::INSTANCE_DATA,
            wgpu::VertexStepMode::Instance,
        )?,
        None => {
            for component in VertexComponent::INSTANCE_DATA {
                backend.disable_attribute(component.attribute_index());
            }
        }
    }

    backend.bind_buffer(BufferKind::Index, index_buffer);
    Ok(())
}
