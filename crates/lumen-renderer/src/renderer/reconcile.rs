use bitflags::bitflags;

use crate::backend::{Backend, BufferId, ContextId, ProgramId};
use crate::caps::{Capabilities, CapabilityTable};
use crate::coords::Vec2;
use crate::resources::{
    Handle, IndexBuffer, Resources, Shader, ShaderUniform, VertexBuffer, VertexLayout,
};
use crate::vao::{declare_attributes, Lookup, VaoKey, VertexSource};

use super::{RenderError, Renderer};

bitflags! {
    /// Tracked state awaiting synchronization.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        const MATRICES      = 1 << 0;
        const SHADER        = 1 << 1;
        const TEXTURES      = 1 << 2;
        const VERTEX_LAYOUT = 1 << 3;
    }
}

impl DirtyFlags {
    /// State right after setup: everything but textures needs a first sync.
    #[inline]
    pub const fn initial() -> Self {
        Self::MATRICES.union(Self::SHADER).union(Self::VERTEX_LAYOUT)
    }
}

/// Validated bindings for one reconciliation. Plain copies, so the renderer
/// stays free to mutate itself while using them.
#[derive(Debug, Copy, Clone)]
struct Bound {
    context: ContextId,
    shader: Handle<Shader>,
    program: ProgramId,
    target_size: (u32, u32),
    vertex_buffer: Handle<VertexBuffer>,
    layout: Handle<VertexLayout>,
    index_buffer: Option<(Handle<IndexBuffer>, BufferId)>,
    instancing: Option<(Handle<VertexLayout>, BufferId)>,
}

/// Declares the bound buffers' attributes on whatever vertex array is bound.
fn declare_bound<B: Backend>(
    backend: &mut B,
    caps: &CapabilityTable,
    resources: &Resources,
    bound: &Bound,
) -> Result<(), RenderError> {
    let stale = || RenderError::InvalidResource("bound vertex data was released".into());

    let vb = resources.get(bound.vertex_buffer).ok_or_else(stale)?;
    let layout = resources.get(bound.layout).ok_or_else(stale)?;
    let vertices = VertexSource {
        buffer: vb.buffer,
        start_offset: vb.start_offset,
        layout,
    };

    let instances = match bound.instancing {
        Some((handle, buffer)) => Some(VertexSource {
            buffer,
            start_offset: 0,
            layout: resources.get(handle).ok_or_else(stale)?,
        }),
        None => None,
    };

    declare_attributes(
        backend,
        caps,
        vertices,
        instances,
        bound.index_buffer.map(|(_, id)| id),
    )
}

impl<B: Backend> Renderer<B> {
    /// Resolves every binding a draw needs. Issues no backend command.
    fn validate_bindings(&self, instanced: bool) -> Result<Bound, RenderError> {
        if !self.is_initialized() {
            return Err(RenderError::NotInitialized);
        }
        let context = self.backend.current_context().ok_or(RenderError::NoContext)?;

        let shader_handle = self.shader.ok_or(RenderError::NoShader)?;
        let shader = self
            .resources
            .get(shader_handle)
            .ok_or_else(|| RenderError::InvalidResource("bound shader was released".into()))?;

        let target = self
            .target
            .and_then(|h| self.resources.get(h))
            .ok_or(RenderError::NoTarget)?;

        let vertex_buffer = self.vertex_buffer.ok_or(RenderError::NoVertexBuffer)?;
        let vb = self.resources.get(vertex_buffer).ok_or(RenderError::NoVertexBuffer)?;
        if !self.resources.contains(vb.layout) {
            return Err(RenderError::InvalidResource(
                "vertex buffer layout was released".into(),
            ));
        }

        let index_buffer = match self.index_buffer {
            Some(h) => {
                let ib = self.resources.get(h).ok_or(RenderError::NoIndexBuffer)?;
                Some((h, ib.buffer))
            }
            None => None,
        };

        let instancing = if instanced {
            let layout = self
                .instance_layout
                .filter(|h| self.resources.contains(*h))
                .ok_or(RenderError::NoInstanceLayout)?;
            let buffer = self
                .instance_buffer
                .ok_or(RenderError::Unsupported(Capabilities::INSTANCING))?;
            Some((layout, buffer))
        } else {
            None
        };

        Ok(Bound {
            context,
            shader: shader_handle,
            program: shader.program,
            target_size: target.size(),
            vertex_buffer,
            layout: vb.layout,
            index_buffer,
            instancing,
        })
    }

    /// Brings backend state in line with tracked state before a draw.
    ///
    /// Every precondition is checked first; a failing one returns with no
    /// backend command issued.
    pub(crate) fn ensure_state_update(&mut self, instanced: bool) -> Result<(), RenderError> {
        let bound = self.validate_bindings(instanced)?;

        self.vaos.drain_pending(&mut self.backend);

        if self.instancing != instanced {
            self.instancing = instanced;
            self.dirty |= DirtyFlags::VERTEX_LAYOUT;
        }
        if self.layout_context != Some(bound.context) {
            self.layout_context = Some(bound.context);
            self.dirty |= DirtyFlags::VERTEX_LAYOUT;
        }

        self.backend.use_program(bound.program);

        if self.dirty.contains(DirtyFlags::SHADER) {
            if let Some(shader) = self.resources.get(bound.shader) {
                let located = self.matrices.resolve_locations(shader);
                log::trace!("shader changed: {} matrix uniform(s) located", located);
            }
            self.sent_target_size = None;
            self.dirty |= DirtyFlags::MATRICES;
            self.dirty -= DirtyFlags::SHADER;
        }

        self.send_target_size(&bound);

        if self.dirty.contains(DirtyFlags::TEXTURES) {
            self.textures.flush(&mut self.backend, &self.resources);
            self.dirty -= DirtyFlags::TEXTURES;
        }

        if self.dirty.contains(DirtyFlags::MATRICES) {
            self.matrices.flush(&mut self.backend);
            self.dirty -= DirtyFlags::MATRICES;
        }

        let use_vaos = self.caps.has(Capabilities::VERTEX_ARRAY_OBJECTS);
        if self.dirty.contains(DirtyFlags::VERTEX_LAYOUT) {
            if use_vaos {
                self.update_vertex_array(&bound)?;
                self.dirty -= DirtyFlags::VERTEX_LAYOUT;
            } else {
                // No composite objects: attributes are redeclared on every draw.
                declare_bound(&mut self.backend, &self.caps, &self.resources, &bound)?;
            }
        }

        if use_vaos {
            let Some(vao) = self.current_vao else {
                return Err(RenderError::InvalidResource("no vertex array for the bound buffers".into()));
            };
            self.backend.bind_vertex_array(Some(vao));
        }

        self.textures.verify_bindings(&mut self.backend, &self.resources);

        self.backend.apply_states(&self.states);
        Ok(())
    }

    /// Sends `TargetSize` and its reciprocal when the target size changed.
    /// A zero dimension sends an infinite reciprocal.
    fn send_target_size(&mut self, bound: &Bound) {
        if self.sent_target_size == Some(bound.target_size) {
            return;
        }

        if let Some(shader) = self.resources.get(bound.shader) {
            let (width, height) = bound.target_size;
            let size = Vec2::from_size(width, height);

            if let Some(location) = shader.uniform_location(ShaderUniform::InvTargetSize) {
                self.backend.send_vec2(location, size.recip());
            }
            if let Some(location) = shader.uniform_location(ShaderUniform::TargetSize) {
                self.backend.send_vec2(location, size);
            }
        }
        self.sent_target_size = Some(bound.target_size);
    }

    fn update_vertex_array(&mut self, bound: &Bound) -> Result<(), RenderError> {
        let key = VaoKey {
            index_buffer: bound.index_buffer.map(|(h, _)| h),
            vertex_buffer: bound.vertex_buffer,
            layout: bound.layout,
            instancing: bound.instancing.map(|(h, _)| h),
        };

        let caps = &self.caps;
        let resources = &self.resources;
        let lookup = self
            .vaos
            .get_or_create(&mut self.backend, bound.context, key, |backend| {
                declare_bound(backend, caps, resources, bound)
            });

        match lookup {
            Ok(lookup) => {
                if matches!(lookup, Lookup::Built(_)) && !caps.auto_unbinds_vertex_arrays() {
                    self.backend.bind_vertex_array(None);
                }
                self.current_vao = Some(lookup.id());
                Ok(())
            }
            Err(err) => {
                self.current_vao = None;
                Err(err)
            }
        }
    }

    /// Ends a draw: the vertex array is unbound so later buffer binds cannot alter it.
    pub(crate) fn finish_draw(&mut self) {
        if self.caps.has(Capabilities::VERTEX_ARRAY_OBJECTS) {
            self.backend.bind_vertex_array(None);
        }
    }
}
