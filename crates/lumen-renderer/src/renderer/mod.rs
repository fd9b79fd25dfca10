//! The renderer: tracked state plus per-draw reconciliation against a [`Backend`].
//!
//! Responsibilities:
//! - own the matrix cache, texture unit table, vertex-layout cache and state snapshot
//! - validate and synchronize bound state immediately before each draw
//! - reference-counted setup and teardown of renderer-owned backend objects
//!
//! All operations take `&mut self`; the renderer is single-threaded and must be
//! driven from the thread owning the current graphics context.

mod config;
mod draw;
mod error;
mod lifecycle;
mod reconcile;
mod setters;
mod shaders;


pub use config::RendererConfig;
pub use error::{ErrorKind, RenderError};
pub use lifecycle::SetupStep;
pub use reconcile::DirtyFlags;
pub use shaders::{debug_shader_sources, ShaderLibrary, DEBUG_SHADER_NAME};

use crate::backend::{Backend, BufferId, ContextId, ProgramId, VertexArrayId};
use crate::caps::CapabilityTable;
use crate::matrix::MatrixCache;
use crate::resources::{
    Handle, IndexBuffer, Released, RenderTarget, Resource, ResourceId, Resources, Shader,
    VertexBuffer, VertexLayout,
};
use crate::states::RenderStates;
use crate::textures::TextureUnitTable;
use crate::vao::VaoCache;

/// Full-screen quad owned by the renderer.
#[derive(Debug, Copy, Clone)]
struct FullscreenQuad {
    buffer: BufferId,
    layout: Handle<VertexLayout>,
    vertices: Handle<VertexBuffer>,
}

pub struct Renderer<B: Backend> {
    backend: B,
    config: RendererConfig,

    ref_count: u32,
    completed: Vec<SetupStep>,

    caps: CapabilityTable,
    resources: Resources,
    shaders: ShaderLibrary,

    matrices: MatrixCache,
    textures: TextureUnitTable,
    vaos: VaoCache,
    states: RenderStates,
    dirty: DirtyFlags,

    shader: Option<Handle<Shader>>,
    target: Option<Handle<RenderTarget>>,
    vertex_buffer: Option<Handle<VertexBuffer>>,
    index_buffer: Option<Handle<IndexBuffer>>,

    /// Whether the last reconciliation declared instance attributes.
    instancing: bool,
    instance_layout: Option<Handle<VertexLayout>>,
    instance_buffer: Option<BufferId>,

    fullscreen_quad: Option<FullscreenQuad>,
    debug_program: Option<(ProgramId, Handle<Shader>)>,

    /// Target size last sent as uniforms. `None` forces a resend.
    sent_target_size: Option<(u32, u32)>,
    /// Context the current vertex array belongs to.
    layout_context: Option<ContextId>,
    current_vao: Option<VertexArrayId>,
}

impl<B: Backend> Renderer<B> {
    pub fn new(backend: B, config: RendererConfig) -> Self {
        Self {
            backend,
            config,
            ref_count: 0,
            completed: Vec::new(),
            caps: CapabilityTable::default(),
            resources: Resources::new(),
            shaders: ShaderLibrary::default(),
            matrices: MatrixCache::new(),
            textures: TextureUnitTable::new(1, 1, false),
            vaos: VaoCache::new(),
            states: RenderStates::default(),
            dirty: DirtyFlags::initial(),
            shader: None,
            target: None,
            vertex_buffer: None,
            index_buffer: None,
            instancing: false,
            instance_layout: None,
            instance_buffer: None,
            fullscreen_quad: None,
            debug_program: None,
            sent_target_size: None,
            layout_context: None,
            current_vao: None,
        }
    }

    #[inline]
    pub fn with_defaults(backend: B) -> Self {
        Self::new(backend, RendererConfig::default())
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct backend access. Changes made here bypass state tracking.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn capabilities(&self) -> &CapabilityTable {
        &self.caps
    }

    #[inline]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    #[inline]
    pub fn shader_library(&self) -> &ShaderLibrary {
        &self.shaders
    }

    /// Looks a published shader up by name (e.g. [`DEBUG_SHADER_NAME`]).
    #[inline]
    pub fn shader_by_name(&self, name: &str) -> Option<Handle<Shader>> {
        self.shaders.get(name)
    }

    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    #[inline]
    pub fn vertex_layout_cache(&self) -> &VaoCache {
        &self.vaos
    }

    // ── resources ─────────────────────────────────────────────────────────

    /// Registers a resource descriptor and returns its identity.
    #[inline]
    pub fn register<T: Resource>(&mut self, value: T) -> Handle<T> {
        self.resources.insert(value)
    }

    /// Releases a resource: its handle stops resolving, cached vertex arrays keyed
    /// on it are evicted in every context and bindings referencing it are cleared.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn release(&mut self, id: impl Into<ResourceId>) -> bool {
        let Some(Released(id)) = self.resources.release(id.into()) else {
            return false;
        };

        self.vaos.on_release(&mut self.backend, id);

        match id {
            ResourceId::IndexBuffer(h) => {
                if self.index_buffer == Some(h) {
                    self.index_buffer = None;
                    self.dirty |= DirtyFlags::VERTEX_LAYOUT;
                }
            }
            ResourceId::VertexBuffer(h) => {
                if self.vertex_buffer == Some(h) {
                    self.vertex_buffer = None;
                    self.dirty |= DirtyFlags::VERTEX_LAYOUT;
                }
            }
            ResourceId::VertexLayout(h) => {
                if self.instance_layout == Some(h) {
                    self.instance_layout = None;
                    self.dirty |= DirtyFlags::VERTEX_LAYOUT;
                }
            }
            ResourceId::Shader(h) => {
                self.shaders.forget(h);
                if self.shader == Some(h) {
                    self.shader = None;
                    self.dirty |= DirtyFlags::SHADER;
                }
            }
            ResourceId::Texture(h) => {
                self.textures.forget_texture(h);
            }
            ResourceId::RenderTarget(h) => {
                if self.target == Some(h) {
                    self.target = None;
                }
            }
        }

        log::debug!("resource {:?} released", id);
        true
    }

    // ── contexts ──────────────────────────────────────────────────────────

    /// Makes `context` current and runs the vertex-array deletes queued on it.
    pub fn make_current(&mut self, context: ContextId) -> Result<(), RenderError> {
        self.backend
            .make_current(context)
            .map_err(|e| error::report("make_current", e.into()))?;
        self.vaos.drain_pending(&mut self.backend);
        Ok(())
    }

    /// Forgets a destroyed context. Its vertex arrays died with it; no deletes are issued.
    pub fn release_context(&mut self, context: ContextId) {
        let dropped = self.vaos.forget_context(context);
        if self.layout_context == Some(context) {
            self.layout_context = None;
            self.current_vao = None;
        }
        log::debug!("{:?} released ({} cached vertex array(s) dropped)", context, dropped);
    }

    // ── matrices ──────────────────────────────────────────────────────────

    /// Singular matrices met while computing inverse slots.
    #[inline]
    pub fn inversion_failures(&self) -> u64 {
        self.matrices.inversion_failures()
    }
}
