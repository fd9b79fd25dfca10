use crate::backend::{Backend, ClearFlags, QueryCondition, QueryId};
use crate::caps::Capabilities;
use crate::coords::{ColorRgba, Matrix4, Rect};
use crate::matrix::MatrixKind;
use crate::resources::{Handle, IndexBuffer, RenderTarget, Shader, Texture, VertexBuffer, VertexLayout};
use crate::states::{FaceSide, RenderStates, RendererParameter};
use crate::textures::TextureSampler;

use super::error::report;
use super::{DirtyFlags, RenderError, Renderer};

impl<B: Backend> Renderer<B> {
    // ── matrices ──────────────────────────────────────────────────────────

    /// Sets a matrix slot and invalidates the slots derived from it.
    pub fn set_matrix(&mut self, kind: MatrixKind, value: Matrix4) {
        self.matrices.set(kind, value);
        self.dirty |= DirtyFlags::MATRICES;
    }

    /// Current value of a slot. Derived slots are recomputed on demand.
    pub fn get_matrix(&mut self, kind: MatrixKind) -> Matrix4 {
        self.matrices.get(kind)
    }

    // ── shader / target ───────────────────────────────────────────────────

    pub fn set_shader(&mut self, shader: Option<Handle<Shader>>) -> Result<(), RenderError> {
        if self.shader == shader {
            return Ok(());
        }

        if let Some(handle) = shader {
            let desc = self
                .resources
                .get(handle)
                .ok_or_else(|| RenderError::InvalidResource("shader was released".into()))
                .map_err(|e| report("set_shader", e))?;
            if !desc.linked {
                return Err(report(
                    "set_shader",
                    RenderError::InvalidResource("shader program is not linked".into()),
                ));
            }
        }

        self.shader = shader;
        self.dirty |= DirtyFlags::SHADER;
        Ok(())
    }

    #[inline]
    pub fn shader(&self) -> Option<Handle<Shader>> {
        self.shader
    }

    /// Binds a render target and activates it: its context is made current and
    /// its framebuffer bound. Vertex-array deletes queued on that context run.
    pub fn set_target(&mut self, target: Option<Handle<RenderTarget>>) -> Result<(), RenderError> {
        if self.target == target {
            return Ok(());
        }
        self.target = None;

        let Some(handle) = target else {
            return Ok(());
        };
        let desc = self
            .resources
            .get(handle)
            .cloned()
            .ok_or_else(|| RenderError::InvalidResource("render target was released".into()))
            .map_err(|e| report("set_target", e))?;
        if !desc.renderable {
            return Err(report(
                "set_target",
                RenderError::InvalidResource("render target is not renderable".into()),
            ));
        }
        if desc.framebuffer.is_some() {
            self.caps
                .require(Capabilities::RENDER_TEXTURE)
                .map_err(|e| report("set_target", e))?;
        }

        if let Some(context) = desc.context {
            if self.backend.current_context() != Some(context) {
                self.backend
                    .make_current(context)
                    .map_err(|e| report("set_target", e.into()))?;
            }
        }
        self.backend.bind_framebuffer(desc.framebuffer);
        self.vaos.drain_pending(&mut self.backend);

        self.target = Some(handle);
        log::debug!("target {:?} activated ({}x{})", handle, desc.width, desc.height);
        Ok(())
    }

    #[inline]
    pub fn target(&self) -> Option<Handle<RenderTarget>> {
        self.target
    }

    // ── textures ──────────────────────────────────────────────────────────

    pub fn set_texture(&mut self, unit: u32, texture: Option<Handle<Texture>>) -> Result<(), RenderError> {
        let entry = match texture {
            Some(handle) => {
                let desc = self
                    .resources
                    .get(handle)
                    .ok_or_else(|| RenderError::InvalidResource("texture was released".into()))
                    .map_err(|e| report("set_texture", e))?;
                self.caps
                    .check_texture(desc)
                    .map_err(|e| report("set_texture", e))?;
                Some((handle, desc))
            }
            None => None,
        };

        let changed = self
            .textures
            .set_texture(unit, entry)
            .map_err(|e| report("set_texture", e))?;
        if changed {
            self.dirty |= DirtyFlags::TEXTURES;
        }
        Ok(())
    }

    /// Texture bound to `unit`, if any.
    #[inline]
    pub fn texture(&self, unit: u32) -> Option<Handle<Texture>> {
        self.textures.texture(unit)
    }

    #[inline]
    pub fn texture_sampler(&self, unit: u32) -> Option<&TextureSampler> {
        self.textures.sampler(unit)
    }

    pub fn set_texture_sampler(&mut self, unit: u32, sampler: TextureSampler) -> Result<(), RenderError> {
        self.textures
            .set_sampler(unit, sampler, &self.resources)
            .map_err(|e| report("set_texture_sampler", e))?;
        self.dirty |= DirtyFlags::TEXTURES;
        Ok(())
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn set_vertex_buffer(&mut self, buffer: Option<Handle<VertexBuffer>>) -> Result<(), RenderError> {
        if let Some(handle) = buffer {
            let desc = self
                .resources
                .get(handle)
                .ok_or_else(|| RenderError::InvalidResource("vertex buffer was released".into()))
                .map_err(|e| report("set_vertex_buffer", e))?;
            if !desc.hardware {
                return Err(report(
                    "set_vertex_buffer",
                    RenderError::InvalidResource("buffer must be hardware".into()),
                ));
            }
        }

        if self.vertex_buffer != buffer {
            self.vertex_buffer = buffer;
            self.dirty |= DirtyFlags::VERTEX_LAYOUT;
        }
        Ok(())
    }

    pub fn set_index_buffer(&mut self, buffer: Option<Handle<IndexBuffer>>) -> Result<(), RenderError> {
        if let Some(handle) = buffer {
            let desc = self
                .resources
                .get(handle)
                .ok_or_else(|| RenderError::InvalidResource("index buffer was released".into()))
                .map_err(|e| report("set_index_buffer", e))?;
            if !desc.hardware {
                return Err(report(
                    "set_index_buffer",
                    RenderError::InvalidResource("buffer must be hardware".into()),
                ));
            }
        }

        if self.index_buffer != buffer {
            self.index_buffer = buffer;
            self.dirty |= DirtyFlags::VERTEX_LAYOUT;
        }
        Ok(())
    }

    #[inline]
    pub fn vertex_buffer(&self) -> Option<Handle<VertexBuffer>> {
        self.vertex_buffer
    }

    #[inline]
    pub fn index_buffer(&self) -> Option<Handle<IndexBuffer>> {
        self.index_buffer
    }

    // ── instancing ────────────────────────────────────────────────────────

    /// Sets the layout of per-instance data used by instanced draws.
    pub fn set_instance_layout(&mut self, layout: Option<Handle<VertexLayout>>) -> Result<(), RenderError> {
        self.caps
            .require(Capabilities::INSTANCING)
            .map_err(|e| report("set_instance_layout", e))?;

        if let Some(handle) = layout {
            let stride = self
                .resources
                .get(handle)
                .map(VertexLayout::stride)
                .ok_or_else(|| RenderError::InvalidResource("instance layout was released".into()))
                .map_err(|e| report("set_instance_layout", e))?;
            if stride == 0 {
                return Err(report(
                    "set_instance_layout",
                    RenderError::InvalidArgument("instance layout is empty".into()),
                ));
            }
        }

        if self.instance_layout != layout {
            self.instance_layout = layout;
            self.dirty |= DirtyFlags::VERTEX_LAYOUT;
        }
        Ok(())
    }

    /// Instances the instance buffer can hold with the current layout. 0 without one.
    pub fn instance_capacity(&self) -> u32 {
        let Some(layout) = self.instance_layout.and_then(|h| self.resources.get(h)) else {
            return 0;
        };
        if self.instance_buffer.is_none() || layout.stride() == 0 {
            return 0;
        }
        let capacity = self.config.instance_buffer_size / u64::from(layout.stride());
        u32::try_from(capacity).unwrap_or(u32::MAX)
    }

    /// Uploads raw per-instance data at the start of the instance buffer.
    pub fn write_instance_data(&mut self, data: &[u8]) -> Result<(), RenderError> {
        let Some(buffer) = self.instance_buffer else {
            return Err(report(
                "write_instance_data",
                RenderError::Unsupported(Capabilities::INSTANCING),
            ));
        };
        if data.len() as u64 > self.config.instance_buffer_size {
            return Err(report(
                "write_instance_data",
                RenderError::InvalidArgument(format!(
                    "{} bytes exceed the {} byte instance buffer",
                    data.len(),
                    self.config.instance_buffer_size
                )),
            ));
        }

        self.backend
            .upload_buffer(buffer, 0, data)
            .map_err(|e| report("write_instance_data", e.into()))
    }

    #[inline]
    pub fn write_instances<T: bytemuck::Pod>(&mut self, instances: &[T]) -> Result<(), RenderError> {
        self.write_instance_data(bytemuck::cast_slice(instances))
    }

    // ── render states ─────────────────────────────────────────────────────

    /// Replaces the whole state snapshot. Applied at the next draw or clear.
    #[inline]
    pub fn set_render_states(&mut self, states: RenderStates) {
        self.states = states;
    }

    #[inline]
    pub fn render_states(&self) -> &RenderStates {
        &self.states
    }

    #[inline]
    pub fn enable(&mut self, parameter: RendererParameter, enable: bool) {
        self.states.set_enabled(parameter, enable);
    }

    #[inline]
    pub fn is_enabled(&self, parameter: RendererParameter) -> bool {
        self.states.is_enabled(parameter)
    }

    pub fn set_blend_func(&mut self, src: wgpu::BlendFactor, dst: wgpu::BlendFactor) {
        self.states.src_blend = src;
        self.states.dst_blend = dst;
    }

    pub fn set_depth_func(&mut self, compare: wgpu::CompareFunction) {
        self.states.depth_func = compare;
    }

    pub fn set_face_culling(&mut self, side: FaceSide) {
        self.states.face_culling = side;
    }

    pub fn set_face_filling(&mut self, mode: wgpu::PolygonMode) {
        self.states.face_filling = mode;
    }

    pub fn set_stencil_compare_function(&mut self, compare: wgpu::CompareFunction, side: FaceSide) {
        self.states.stencil_mut(side, |face| face.compare = compare);
    }

    pub fn set_stencil_fail_operation(&mut self, op: wgpu::StencilOperation, side: FaceSide) {
        self.states.stencil_mut(side, |face| face.fail = op);
    }

    pub fn set_stencil_pass_operation(&mut self, op: wgpu::StencilOperation, side: FaceSide) {
        self.states.stencil_mut(side, |face| face.pass = op);
    }

    pub fn set_stencil_z_fail_operation(&mut self, op: wgpu::StencilOperation, side: FaceSide) {
        self.states.stencil_mut(side, |face| face.z_fail = op);
    }

    pub fn set_stencil_mask(&mut self, mask: u32, side: FaceSide) {
        self.states.stencil_mut(side, |face| face.mask = mask);
    }

    pub fn set_stencil_reference_value(&mut self, reference: u32, side: FaceSide) {
        self.states.stencil_mut(side, |face| face.reference = reference);
    }

    pub fn set_line_width(&mut self, width: f32) -> Result<(), RenderError> {
        if width.is_nan() || width <= 0.0 {
            return Err(report(
                "set_line_width",
                RenderError::InvalidArgument(format!("line width must be positive, got {width}")),
            ));
        }
        self.states.line_width = width;
        Ok(())
    }

    pub fn set_point_size(&mut self, size: f32) -> Result<(), RenderError> {
        if size.is_nan() || size <= 0.0 {
            return Err(report(
                "set_point_size",
                RenderError::InvalidArgument(format!("point size must be positive, got {size}")),
            ));
        }
        self.states.point_size = size;
        Ok(())
    }

    // ── backend pass-through state ────────────────────────────────────────

    #[inline]
    pub fn set_scissor_rect(&mut self, rect: Rect) {
        self.backend.set_scissor(rect);
    }

    #[inline]
    pub fn scissor_rect(&self) -> Rect {
        self.backend.scissor()
    }

    #[inline]
    pub fn set_viewport(&mut self, rect: Rect) {
        self.backend.set_viewport(rect);
    }

    #[inline]
    pub fn viewport(&self) -> Rect {
        self.backend.viewport()
    }

    #[inline]
    pub fn set_clear_color(&mut self, color: ColorRgba) {
        self.backend.set_clear_color(color);
    }

    #[inline]
    pub fn set_clear_depth(&mut self, depth: f64) {
        self.backend.set_clear_depth(depth);
    }

    #[inline]
    pub fn set_clear_stencil(&mut self, value: u32) {
        self.backend.set_clear_stencil(value);
    }

    /// Clears the bound target. The state snapshot is applied first so write
    /// masks take effect.
    pub fn clear(&mut self, flags: ClearFlags) -> Result<(), RenderError> {
        let ready = if !self.is_initialized() {
            Err(RenderError::NotInitialized)
        } else if self.backend.current_context().is_none() {
            Err(RenderError::NoContext)
        } else if !self.target.is_some_and(|h| self.resources.contains(h)) {
            Err(RenderError::NoTarget)
        } else {
            Ok(())
        };
        ready.map_err(|e| report("clear", e))?;

        if flags.is_empty() {
            return Ok(());
        }

        self.backend.apply_states(&self.states);
        self.backend.clear(flags);
        Ok(())
    }

    // ── submission control ────────────────────────────────────────────────

    /// Makes subsequent draws conditional on the result of `query`.
    pub fn begin_condition(&mut self, query: QueryId, condition: QueryCondition) -> Result<(), RenderError> {
        self.caps
            .require(Capabilities::CONDITIONAL_RENDERING)
            .map_err(|e| report("begin_condition", e))?;
        self.backend.begin_conditional_render(query, condition);
        Ok(())
    }

    pub fn end_condition(&mut self) -> Result<(), RenderError> {
        self.caps
            .require(Capabilities::CONDITIONAL_RENDERING)
            .map_err(|e| report("end_condition", e))?;
        self.backend.end_conditional_render();
        Ok(())
    }

    #[inline]
    pub fn flush(&mut self) {
        self.backend.flush();
    }

    // ── capabilities ──────────────────────────────────────────────────────

    #[inline]
    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.caps.has(capability)
    }

    #[inline]
    pub fn max_anisotropy_level(&self) -> u8 {
        self.caps.limits().max_anisotropy
    }

    #[inline]
    pub fn max_color_attachments(&self) -> u32 {
        self.caps.limits().max_color_attachments
    }

    #[inline]
    pub fn max_render_targets(&self) -> u32 {
        self.caps.limits().max_render_targets
    }

    #[inline]
    pub fn max_texture_size(&self) -> u32 {
        self.caps.limits().max_texture_size
    }

    #[inline]
    pub fn max_texture_units(&self) -> u32 {
        self.caps.limits().max_texture_units
    }

    #[inline]
    pub fn max_vertex_attribs(&self) -> u32 {
        self.caps.limits().max_vertex_attribs
    }
}
