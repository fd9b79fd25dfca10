use anyhow::{Context, Result};

use crate::backend::{Backend, BufferKind, BufferUsage};
use crate::caps::{Capabilities, CapabilityTable};
use crate::resources::{Shader, VertexBuffer, VertexLayout};
use crate::states::RenderStates;
use crate::textures::TextureUnitTable;

use super::shaders::{compile_debug_shader, DEBUG_SHADER_NAME};
use super::{DirtyFlags, FullscreenQuad, Renderer};

/// Setup stages, in execution order. Teardown undoes them in reverse.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetupStep {
    Startup,
    Capabilities,
    FullscreenQuad,
    InstanceBuffer,
    DebugShader,
}

/// Clip-space triangle strip covering the viewport.
const QUAD_VERTICES: [f32; 8] = [
    -1.0, -1.0, //
    1.0, -1.0, //
    -1.0, 1.0, //
    1.0, 1.0, //
];

impl<B: Backend> Renderer<B> {
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.ref_count > 0
    }

    /// Setup steps completed so far, in order.
    #[inline]
    pub fn completed_steps(&self) -> &[SetupStep] {
        &self.completed
    }

    /// Starts the renderer. Reference-counted: only the first call does real work.
    ///
    /// A failing step unwinds every step completed before it.
    pub fn initialize(&mut self) -> Result<()> {
        if self.ref_count > 0 {
            self.ref_count += 1;
            return Ok(());
        }

        log::info!("initializing renderer");
        if let Err(err) = self.run_setup() {
            log::error!("renderer setup failed: {err:#}");
            self.undo_completed();
            return Err(err);
        }

        self.reset_tracking();
        self.ref_count = 1;
        log::info!(
            "renderer initialized ({} texture units, instancing: {})",
            self.textures.unit_count(),
            self.caps.has(Capabilities::INSTANCING)
        );
        Ok(())
    }

    /// Releases one reference. The last one tears everything down.
    pub fn uninitialize(&mut self) {
        match self.ref_count {
            0 => {
                log::warn!("uninitialize called on a renderer that is not initialized");
                return;
            }
            1 => {}
            _ => {
                self.ref_count -= 1;
                return;
            }
        }

        log::info!("shutting renderer down");
        self.ref_count = 0;

        self.vaos.teardown(&mut self.backend);
        self.current_vao = None;
        self.layout_context = None;
        self.undo_completed();
        self.reset_tracking();
    }

    fn run_setup(&mut self) -> Result<()> {
        self.backend.startup().context("failed to start backend")?;
        self.completed.push(SetupStep::Startup);

        self.caps = CapabilityTable::query(&mut self.backend);
        self.completed.push(SetupStep::Capabilities);

        self.create_fullscreen_quad()
            .context("failed to create full-screen quad buffer")?;
        self.completed.push(SetupStep::FullscreenQuad);

        self.create_instance_buffer();
        self.completed.push(SetupStep::InstanceBuffer);

        if self.config.compile_debug_shader {
            let program = compile_debug_shader(&mut self.backend, self.caps.glsl_version())
                .context("failed to compile debug shader")?;
            let shader = self
                .resources
                .insert(Shader::from_program(&self.backend, program));
            self.shaders.register(DEBUG_SHADER_NAME, shader);
            self.debug_program = Some((program, shader));
        }
        self.completed.push(SetupStep::DebugShader);

        Ok(())
    }

    fn create_fullscreen_quad(&mut self) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(&QUAD_VERTICES);
        let buffer = self
            .backend
            .create_buffer(BufferKind::Vertex, bytes.len() as u64, BufferUsage::Static)?;

        if let Err(err) = self.backend.upload_buffer(buffer, 0, bytes) {
            self.backend.destroy_buffer(buffer);
            return Err(err.into());
        }

        let layout = self.resources.insert(VertexLayout::xy());
        let vertices = self.resources.insert(VertexBuffer::new(buffer, layout, 4));
        self.fullscreen_quad = Some(FullscreenQuad {
            buffer,
            layout,
            vertices,
        });
        Ok(())
    }

    /// Allocates the instance buffer. Failure only disables instancing.
    fn create_instance_buffer(&mut self) {
        if !self.caps.has(Capabilities::INSTANCING) {
            return;
        }

        match self.backend.create_buffer(
            BufferKind::Vertex,
            self.config.instance_buffer_size,
            BufferUsage::Dynamic,
        ) {
            Ok(buffer) => self.instance_buffer = Some(buffer),
            Err(err) => {
                self.caps.disable(Capabilities::INSTANCING);
                log::error!("failed to create instance buffer, instancing disabled: {err}");
            }
        }
    }

    fn undo_completed(&mut self) {
        while let Some(step) = self.completed.pop() {
            log::debug!("undoing setup step {:?}", step);
            match step {
                SetupStep::DebugShader => {
                    if let Some((program, shader)) = self.debug_program.take() {
                        self.shaders.unregister(DEBUG_SHADER_NAME);
                        self.release(shader);
                        self.backend.destroy_program(program);
                    }
                }
                SetupStep::InstanceBuffer => {
                    if let Some(buffer) = self.instance_buffer.take() {
                        self.backend.destroy_buffer(buffer);
                    }
                }
                SetupStep::FullscreenQuad => {
                    if let Some(quad) = self.fullscreen_quad.take() {
                        self.release(quad.vertices);
                        self.release(quad.layout);
                        self.backend.destroy_buffer(quad.buffer);
                    }
                }
                SetupStep::Capabilities => {
                    self.caps = CapabilityTable::default();
                }
                SetupStep::Startup => {
                    self.backend.shutdown();
                }
            }
        }
    }

    /// Clears every binding and returns tracked state to its defaults.
    fn reset_tracking(&mut self) {
        let limits = *self.caps.limits();
        self.textures = TextureUnitTable::new(
            limits.max_texture_units,
            limits.max_anisotropy,
            self.caps.has(Capabilities::SAMPLER_OBJECTS),
        );
        self.matrices.reset();
        self.states = RenderStates::default();
        self.dirty = DirtyFlags::initial();

        self.shader = None;
        self.target = None;
        self.vertex_buffer = None;
        self.index_buffer = None;
        self.instancing = false;
        self.instance_layout = None;
        self.sent_target_size = None;
    }
}
