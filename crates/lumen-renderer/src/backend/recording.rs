use std::collections::HashMap;

use crate::caps::{Capabilities, DeviceProbe, Limits};
use crate::coords::{ColorRgba, Matrix4, Rect, Vec2};
use crate::resources::TextureKind;
use crate::states::RenderStates;
use crate::textures::TextureSampler;

use super::{
    AttributeBinding, Backend, BackendError, BufferId, BufferKind, BufferUsage, ClearFlags,
    ContextId, FramebufferId, PrimitiveMode, ProgramId, QueryCondition, QueryId, TextureId,
    VertexArrayId,
};

/// One recorded backend command.
///
/// Pure queries (`current_context`, `bound_texture`, `uniform_location`, ...) are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Startup,
    Shutdown,
    MakeCurrent(ContextId),

    CreateBuffer { buffer: BufferId, kind: BufferKind, size: u64, usage: BufferUsage },
    UploadBuffer { buffer: BufferId, offset: u64, len: usize },
    DestroyBuffer(BufferId),
    BindBuffer { kind: BufferKind, buffer: Option<BufferId> },

    CreateProgram(ProgramId),
    DestroyProgram(ProgramId),
    UseProgram(ProgramId),
    SendMatrix { location: i32, value: Matrix4 },
    SendVec2 { location: i32, value: Vec2 },

    CreateVertexArray { vao: VertexArrayId, context: Option<ContextId> },
    DeleteVertexArray { vao: VertexArrayId, context: Option<ContextId> },
    BindVertexArray(Option<VertexArrayId>),
    EnableAttribute(AttributeBinding),
    DisableAttribute(u32),

    BindTexture { unit: u32, kind: TextureKind, texture: TextureId },
    BindSampler { unit: u32, sampler: TextureSampler },
    ApplySampler { unit: u32, kind: TextureKind, texture: TextureId, sampler: TextureSampler },

    ApplyStates(RenderStates),
    BindFramebuffer(Option<FramebufferId>),
    SetScissor(Rect),
    SetViewport(Rect),
    SetClearColor(ColorRgba),
    SetClearDepth(f64),
    SetClearStencil(u32),
    Clear(ClearFlags),

    DrawArrays { mode: PrimitiveMode, first: u32, count: u32 },
    DrawArraysInstanced { mode: PrimitiveMode, first: u32, count: u32, instances: u32 },
    DrawElements { mode: PrimitiveMode, count: u32, format: wgpu::IndexFormat, offset: u64 },
    DrawElementsInstanced {
        mode: PrimitiveMode,
        count: u32,
        format: wgpu::IndexFormat,
        offset: u64,
        instances: u32,
    },
    BeginConditionalRender { query: QueryId, condition: QueryCondition },
    EndConditionalRender,
    Flush,
}

impl Call {
    /// Whether this command submits primitives.
    #[inline]
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Call::DrawArrays { .. }
                | Call::DrawArraysInstanced { .. }
                | Call::DrawElements { .. }
                | Call::DrawElementsInstanced { .. }
        )
    }
}

/// Failures the recording backend reports on request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FailureInjection {
    pub startup: bool,
    pub static_buffers: bool,
    pub dynamic_buffers: bool,
    pub programs: bool,
    pub vertex_arrays: bool,
}

/// Headless [`Backend`] that records every command.
///
/// Models the pieces of driver state the renderer reads back: the current
/// context, per-unit texture bindings, uniform locations of linked programs,
/// scissor and viewport boxes, and the owning context of each vertex array.
#[derive(Debug)]
pub struct RecordingBackend {
    calls: Vec<Call>,
    probe: DeviceProbe,
    pub fail: FailureInjection,

    contexts: Vec<ContextId>,
    current: Option<ContextId>,
    next_id: u32,
    next_location: i32,

    programs: HashMap<ProgramId, HashMap<String, i32>>,
    bound_textures: HashMap<u32, TextureId>,
    vertex_arrays: HashMap<VertexArrayId, ContextId>,
    foreign_deletes: usize,

    scissor: Rect,
    viewport: Rect,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Backend reporting every capability, with context 1 alive and current.
    pub fn new() -> Self {
        Self::with_probe(Self::full_probe())
    }

    pub fn with_probe(probe: DeviceProbe) -> Self {
        Self {
            calls: Vec::new(),
            probe,
            fail: FailureInjection::default(),
            contexts: vec![ContextId(1)],
            current: Some(ContextId(1)),
            next_id: 1,
            next_location: 0,
            programs: HashMap::new(),
            bound_textures: HashMap::new(),
            vertex_arrays: HashMap::new(),
            foreign_deletes: 0,
            scissor: Rect::default(),
            viewport: Rect::default(),
        }
    }

    /// Probe answer of a modern desktop driver.
    pub fn full_probe() -> DeviceProbe {
        DeviceProbe {
            capabilities: Capabilities::all(),
            limits: Limits {
                max_anisotropy: 16,
                max_color_attachments: 8,
                max_render_targets: 8,
                max_texture_size: 8192,
                max_texture_units: 16,
                max_vertex_attribs: 16,
            },
            glsl_version: 330,
            auto_unbinds_vertex_arrays: false,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ── test controls ─────────────────────────────────────────────────────

    /// Creates a new context. It does not become current.
    pub fn add_context(&mut self) -> ContextId {
        let id = ContextId(100 + self.next_id());
        self.contexts.push(id);
        id
    }

    /// Destroys a context along with the vertex arrays it owns.
    pub fn destroy_context(&mut self, context: ContextId) {
        self.contexts.retain(|&c| c != context);
        self.vertex_arrays.retain(|_, owner| *owner != context);
        if self.current == Some(context) {
            self.current = None;
        }
    }

    /// Links a program exposing the given uniform names, bypassing source scanning.
    pub fn register_program(&mut self, uniforms: &[&str]) -> ProgramId {
        let program = ProgramId(self.next_id());
        let mut locations = HashMap::new();
        for name in uniforms {
            locations.insert((*name).to_owned(), self.next_location);
            self.next_location += 1;
        }
        self.programs.insert(program, locations);
        program
    }

    /// Simulates code outside the renderer rebinding a texture unit.
    pub fn external_bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.bound_textures.insert(unit, texture);
    }

    // ── inspection ────────────────────────────────────────────────────────

    #[inline]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn draw_count(&self) -> usize {
        self.count(Call::is_draw)
    }

    /// Vertex arrays still alive, across every context.
    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Deletes issued while the owning context was not current.
    pub fn foreign_deletes(&self) -> usize {
        self.foreign_deletes
    }

    pub fn is_program_alive(&self, program: ProgramId) -> bool {
        self.programs.contains_key(&program)
    }
}

/// Collects `uniform <type> <name>;` declarations.
fn scan_uniforms(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut words = line.trim().strip_prefix("uniform ")?.split_whitespace();
            let _ty = words.next()?;
            let name = words.next()?.trim_end_matches(';');
            let name = name.split('[').next().unwrap_or(name);
            (!name.is_empty()).then(|| name.to_owned())
        })
        .collect()
}

impl Backend for RecordingBackend {
    fn startup(&mut self) -> Result<(), BackendError> {
        if self.fail.startup {
            return Err(BackendError::Startup("no usable driver".into()));
        }
        self.calls.push(Call::Startup);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.calls.push(Call::Shutdown);
    }

    fn probe(&mut self) -> DeviceProbe {
        self.probe
    }

    fn current_context(&self) -> Option<ContextId> {
        self.current
    }

    fn make_current(&mut self, context: ContextId) -> Result<(), BackendError> {
        if !self.contexts.contains(&context) {
            return Err(BackendError::Context(context));
        }
        self.current = Some(context);
        self.calls.push(Call::MakeCurrent(context));
        Ok(())
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: u64,
        usage: BufferUsage,
    ) -> Result<BufferId, BackendError> {
        let fails = match usage {
            BufferUsage::Static => self.fail.static_buffers,
            BufferUsage::Dynamic => self.fail.dynamic_buffers,
        };
        if fails {
            return Err(BackendError::OutOfMemory("buffer"));
        }

        let buffer = BufferId(self.next_id());
        self.calls.push(Call::CreateBuffer { buffer, kind, size, usage });
        Ok(buffer)
    }

    fn upload_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), BackendError> {
        self.calls.push(Call::UploadBuffer {
            buffer,
            offset,
            len: data.len(),
        });
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::DestroyBuffer(buffer));
    }

    fn bind_buffer(&mut self, kind: BufferKind, buffer: Option<BufferId>) {
        self.calls.push(Call::BindBuffer { kind, buffer });
    }

    fn create_program(&mut self, vertex_source: &str, fragment_source: &str) -> Result<ProgramId, BackendError> {
        if self.fail.programs {
            return Err(BackendError::Program("link failed".into()));
        }

        let mut names = scan_uniforms(vertex_source);
        for name in scan_uniforms(fragment_source) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let program = self.register_program(&refs);
        self.calls.push(Call::CreateProgram(program));
        Ok(program)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.calls.push(Call::DestroyProgram(program));
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<i32> {
        self.programs.get(&program)?.get(name).copied()
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(Call::UseProgram(program));
    }

    fn send_matrix(&mut self, location: i32, value: &Matrix4) {
        self.calls.push(Call::SendMatrix { location, value: *value });
    }

    fn send_vec2(&mut self, location: i32, value: Vec2) {
        self.calls.push(Call::SendVec2 { location, value });
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayId, BackendError> {
        if self.fail.vertex_arrays {
            return Err(BackendError::OutOfMemory("vertex array"));
        }
        let Some(context) = self.current else {
            return Err(BackendError::OutOfMemory("vertex array without context"));
        };

        let vao = VertexArrayId(self.next_id());
        self.vertex_arrays.insert(vao, context);
        self.calls.push(Call::CreateVertexArray {
            vao,
            context: Some(context),
        });
        Ok(vao)
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        if let Some(owner) = self.vertex_arrays.get(&vao).copied() {
            if Some(owner) == self.current {
                self.vertex_arrays.remove(&vao);
            } else {
                self.foreign_deletes += 1;
            }
        }
        self.calls.push(Call::DeleteVertexArray {
            vao,
            context: self.current,
        });
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
        self.calls.push(Call::BindVertexArray(vao));
    }

    fn enable_attribute(&mut self, binding: &AttributeBinding) {
        self.calls.push(Call::EnableAttribute(*binding));
    }

    fn disable_attribute(&mut self, index: u32) {
        self.calls.push(Call::DisableAttribute(index));
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: TextureId) {
        self.bound_textures.insert(unit, texture);
        self.calls.push(Call::BindTexture { unit, kind, texture });
    }

    fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.bound_textures.get(&unit).copied()
    }

    fn bind_sampler(&mut self, unit: u32, sampler: &TextureSampler) {
        self.calls.push(Call::BindSampler { unit, sampler: *sampler });
    }

    fn apply_sampler(&mut self, unit: u32, kind: TextureKind, texture: TextureId, sampler: &TextureSampler) {
        // Parameters are written through the unit binding.
        self.bound_textures.insert(unit, texture);
        self.calls.push(Call::ApplySampler {
            unit,
            kind,
            texture,
            sampler: *sampler,
        });
    }

    fn apply_states(&mut self, states: &RenderStates) {
        self.calls.push(Call::ApplyStates(*states));
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.calls.push(Call::BindFramebuffer(framebuffer));
    }

    fn set_scissor(&mut self, rect: Rect) {
        self.scissor = rect;
        self.calls.push(Call::SetScissor(rect));
    }

    fn scissor(&self) -> Rect {
        self.scissor
    }

    fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
        self.calls.push(Call::SetViewport(rect));
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn set_clear_color(&mut self, color: ColorRgba) {
        self.calls.push(Call::SetClearColor(color));
    }

    fn set_clear_depth(&mut self, depth: f64) {
        self.calls.push(Call::SetClearDepth(depth));
    }

    fn set_clear_stencil(&mut self, value: u32) {
        self.calls.push(Call::SetClearStencil(value));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.calls.push(Call::Clear(flags));
    }

    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32) {
        self.calls.push(Call::DrawArrays { mode, first, count });
    }

    fn draw_arrays_instanced(&mut self, mode: PrimitiveMode, first: u32, count: u32, instances: u32) {
        self.calls.push(Call::DrawArraysInstanced {
            mode,
            first,
            count,
            instances,
        });
    }

    fn draw_elements(&mut self, mode: PrimitiveMode, count: u32, format: wgpu::IndexFormat, byte_offset: u64) {
        self.calls.push(Call::DrawElements {
            mode,
            count,
            format,
            offset: byte_offset,
        });
    }

    fn draw_elements_instanced(
        &mut self,
        mode: PrimitiveMode,
        count: u32,
        format: wgpu::IndexFormat,
        byte_offset: u64,
        instances: u32,
    ) {
        self.calls.push(Call::DrawElementsInstanced {
            mode,
            count,
            format,
            offset: byte_offset,
            instances,
        });
    }

    fn begin_conditional_render(&mut self, query: QueryId, condition: QueryCondition) {
        self.calls.push(Call::BeginConditionalRender { query, condition });
    }

    fn end_conditional_render(&mut self) {
        self.calls.push(Call::EndConditionalRender);
    }

    fn flush(&mut self) {
        self.calls.push(Call::Flush);
    }
}
