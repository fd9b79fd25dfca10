//! Stateful graphics backend interface.
//!
//! The renderer drives a backend through this narrow trait:
//! - lifecycle + capability probe
//! - context query and switch
//! - object create/destroy primitives (opaque integer handles)
//! - binding calls, uniform sends, state application and draw submission
//!
//! Implementations are expected to be cheap to call redundantly (e.g. binding the
//! already-bound program); the renderer does not shadow every piece of backend state.

mod error;
mod ids;
mod recording;
mod types;

pub use error::BackendError;
pub use ids::{BufferId, ContextId, FramebufferId, ProgramId, QueryId, TextureId, VertexArrayId};
pub use recording::{Call, FailureInjection, RecordingBackend};
pub use types::{
    AttributeBinding, AttributeClass, BufferKind, BufferUsage, ClearFlags, PrimitiveMode,
    QueryCondition,
};

use crate::caps::DeviceProbe;
use crate::coords::{ColorRgba, Matrix4, Rect, Vec2};
use crate::resources::TextureKind;
use crate::states::RenderStates;
use crate::textures::TextureSampler;

pub trait Backend {
    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Brings the driver up. Called once per real renderer setup.
    fn startup(&mut self) -> Result<(), BackendError>;

    /// Tears the driver down. Called last during teardown or setup rollback.
    fn shutdown(&mut self);

    /// Reports feature flags and limits. Queried once per setup.
    fn probe(&mut self) -> DeviceProbe;

    // ── contexts ──────────────────────────────────────────────────────────

    fn current_context(&self) -> Option<ContextId>;

    fn make_current(&mut self, context: ContextId) -> Result<(), BackendError>;

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: u64,
        usage: BufferUsage,
    ) -> Result<BufferId, BackendError>;

    fn upload_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), BackendError>;

    fn destroy_buffer(&mut self, buffer: BufferId);

    fn bind_buffer(&mut self, kind: BufferKind, buffer: Option<BufferId>);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId, BackendError>;

    fn destroy_program(&mut self, program: ProgramId);

    /// Location of a named uniform in a linked program, `None` if absent.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<i32>;

    fn use_program(&mut self, program: ProgramId);

    fn send_matrix(&mut self, location: i32, value: &Matrix4);

    fn send_vec2(&mut self, location: i32, value: Vec2);

    // ── composite vertex layouts ──────────────────────────────────────────

    /// Creates a vertex array object in the current context.
    fn create_vertex_array(&mut self) -> Result<VertexArrayId, BackendError>;

    /// Deletes a vertex array object. Must only be called while its owning context is current.
    fn delete_vertex_array(&mut self, vao: VertexArrayId);

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>);

    fn enable_attribute(&mut self, binding: &AttributeBinding);

    fn disable_attribute(&mut self, index: u32);

    // ── textures ──────────────────────────────────────────────────────────

    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: TextureId);

    /// Texture currently bound to `unit` as seen by the driver.
    fn bound_texture(&self, unit: u32) -> Option<TextureId>;

    /// Binds a sampler object built from `sampler` to `unit`.
    fn bind_sampler(&mut self, unit: u32, sampler: &TextureSampler);

    /// Writes sampler parameters directly into the texture object (no sampler objects).
    fn apply_sampler(&mut self, unit: u32, kind: TextureKind, texture: TextureId, sampler: &TextureSampler);

    // ── fixed state ───────────────────────────────────────────────────────

    /// Applies the full render-state snapshot.
    fn apply_states(&mut self, states: &RenderStates);

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    fn set_scissor(&mut self, rect: Rect);

    fn scissor(&self) -> Rect;

    fn set_viewport(&mut self, rect: Rect);

    fn viewport(&self) -> Rect;

    fn set_clear_color(&mut self, color: ColorRgba);

    fn set_clear_depth(&mut self, depth: f64);

    fn set_clear_stencil(&mut self, value: u32);

    fn clear(&mut self, flags: ClearFlags);

    // ── submission ────────────────────────────────────────────────────────

    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32);

    fn draw_arrays_instanced(&mut self, mode: PrimitiveMode, first: u32, count: u32, instances: u32);

    fn draw_elements(&mut self, mode: PrimitiveMode, count: u32, format: wgpu::IndexFormat, byte_offset: u64);

    fn draw_elements_instanced(
        &mut self,
        mode: PrimitiveMode,
        count: u32,
        format: wgpu::IndexFormat,
        byte_offset: u64,
        instances: u32,
    );

    fn begin_conditional_render(&mut self, query: QueryId, condition: QueryCondition);

    fn end_conditional_render(&mut self);

    fn flush(&mut self);
}
