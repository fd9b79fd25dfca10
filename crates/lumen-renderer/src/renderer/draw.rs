use crate::backend::{Backend, PrimitiveMode};
use crate::caps::Capabilities;

use super::error::report;
use super::{DirtyFlags, RenderError, Renderer};

impl<B: Backend> Renderer<B> {
    // ── non-indexed ───────────────────────────────────────────────────────

    pub fn draw_primitives(&mut self, mode: PrimitiveMode, first: u32, count: u32) -> Result<(), RenderError> {
        self.ensure_state_update(false)
            .map_err(|e| report("draw_primitives", e))?;

        log::trace!("draw {:?} [{}, +{})", mode, first, count);
        self.backend.draw_arrays(mode, first, count);
        self.finish_draw();
        Ok(())
    }

    pub fn draw_primitives_instanced(
        &mut self,
        instances: u32,
        mode: PrimitiveMode,
        first: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        self.check_instances(instances)
            .and_then(|()| self.ensure_state_update(true))
            .map_err(|e| report("draw_primitives_instanced", e))?;

        log::trace!("draw {:?} [{}, +{}) x{}", mode, first, count, instances);
        self.backend.draw_arrays_instanced(mode, first, count, instances);
        self.finish_draw();
        Ok(())
    }

    // ── indexed ───────────────────────────────────────────────────────────

    /// Draws `count` indices starting at `first_index` of the bound index buffer.
    pub fn draw_indexed_primitives(
        &mut self,
        mode: PrimitiveMode,
        first_index: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        let (format, offset) = self
            .index_range(first_index)
            .and_then(|range| self.ensure_state_update(false).map(|()| range))
            .map_err(|e| report("draw_indexed_primitives", e))?;

        log::trace!("draw indexed {:?} [{}, +{})", mode, first_index, count);
        self.backend.draw_elements(mode, count, format, offset);
        self.finish_draw();
        Ok(())
    }

    pub fn draw_indexed_primitives_instanced(
        &mut self,
        instances: u32,
        mode: PrimitiveMode,
        first_index: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        let (format, offset) = self
            .check_instances(instances)
            .and_then(|()| self.index_range(first_index))
            .and_then(|range| self.ensure_state_update(true).map(|()| range))
            .map_err(|e| report("draw_indexed_primitives_instanced", e))?;

        log::trace!(
            "draw indexed {:?} [{}, +{}) x{}",
            mode,
            first_index,
            count,
            instances
        );
        self.backend
            .draw_elements_instanced(mode, count, format, offset, instances);
        self.finish_draw();
        Ok(())
    }

    // ── full-screen quad ──────────────────────────────────────────────────

    /// Draws the renderer's clip-space quad with the bound shader and target.
    ///
    /// Replaces the vertex buffer binding and clears the index buffer binding.
    pub fn draw_fullscreen_quad(&mut self) -> Result<(), RenderError> {
        let Some(quad) = self.fullscreen_quad else {
            return Err(report("draw_fullscreen_quad", RenderError::NotInitialized));
        };

        if self.index_buffer.take().is_some() || self.vertex_buffer != Some(quad.vertices) {
            self.vertex_buffer = Some(quad.vertices);
            self.dirty |= DirtyFlags::VERTEX_LAYOUT;
        }

        self.draw_primitives(PrimitiveMode::TriangleStrip, 0, 4)
    }

    // ── helpers ───────────────────────────────────────────────────────────

    /// Instance count checks run before reconciliation so an overflow issues nothing.
    fn check_instances(&self, instances: u32) -> Result<(), RenderError> {
        if !self.is_initialized() {
            return Err(RenderError::NotInitialized);
        }
        self.caps.require(Capabilities::INSTANCING)?;
        if instances == 0 {
            return Err(RenderError::InvalidArgument("instance count must be positive".into()));
        }
        if self.instance_layout.is_none() {
            return Err(RenderError::NoInstanceLayout);
        }

        let capacity = self.instance_capacity();
        if instances > capacity {
            return Err(RenderError::InstanceOverflow {
                count: instances,
                capacity,
            });
        }
        Ok(())
    }

    fn index_range(&self, first_index: u32) -> Result<(wgpu::IndexFormat, u64), RenderError> {
        let ib = self
            .index_buffer
            .and_then(|h| self.resources.get(h))
            .ok_or(RenderError::NoIndexBuffer)?;
        let offset = ib.start_offset + u64::from(first_index) * ib.index_size();
        Ok((ib.index_format(), offset))
    }
}
