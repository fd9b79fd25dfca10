//! Resource descriptors and their registries.
//!
//! Responsibilities:
//! - hold the structural views the renderer binds (buffers, layouts, shaders, textures, targets)
//! - hand out generational handles used as identities by every cache
//! - make released handles unresolvable

mod arena;
mod buffer;
mod handle;
mod layout;
mod shader;
mod target;
mod texture;

pub use arena::Arena;
pub use buffer::{IndexBuffer, VertexBuffer};
pub use handle::{Handle, Released, ResourceId};
pub use layout::{LayoutEntry, VertexComponent, VertexLayout};
pub use shader::{Shader, ShaderUniform};
pub use target::RenderTarget;
pub use texture::{Texture, TextureKind};

/// Resource type stored in [`Resources`].
pub trait Resource: Sized {
    fn arena(resources: &Resources) -> &Arena<Self>;
    fn arena_mut(resources: &mut Resources) -> &mut Arena<Self>;
}

/// One arena per resource kind.
#[derive(Debug, Default)]
pub struct Resources {
    index_buffers: Arena<IndexBuffer>,
    vertex_buffers: Arena<VertexBuffer>,
    vertex_layouts: Arena<VertexLayout>,
    shaders: Arena<Shader>,
    textures: Arena<Texture>,
    targets: Arena<RenderTarget>,
}

macro_rules! impl_resource {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl Resource for $ty {
                #[inline]
                fn arena(resources: &Resources) -> &Arena<Self> {
                    &resources.$field
                }

                #[inline]
                fn arena_mut(resources: &mut Resources) -> &mut Arena<Self> {
                    &mut resources.$field
                }
            }
        )*
    };
}

impl_resource!(
    IndexBuffer => index_buffers,
    VertexBuffer => vertex_buffers,
    VertexLayout => vertex_layouts,
    Shader => shaders,
    Texture => textures,
    RenderTarget => targets,
);

impl Resources {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert<T: Resource>(&mut self, value: T) -> Handle<T> {
        T::arena_mut(self).insert(value)
    }

    #[inline]
    pub fn get<T: Resource>(&self, handle: Handle<T>) -> Option<&T> {
        T::arena(self).get(handle)
    }

    #[inline]
    pub fn get_mut<T: Resource>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        T::arena_mut(self).get_mut(handle)
    }

    #[inline]
    pub fn contains<T: Resource>(&self, handle: Handle<T>) -> bool {
        T::arena(self).contains(handle)
    }

    /// Drops the descriptor behind `id`. Stale ids produce no event.
    pub(crate) fn release(&mut self, id: ResourceId) -> Option<Released> {
        let removed = match id {
            ResourceId::IndexBuffer(h) => self.index_buffers.remove(h).is_some(),
            ResourceId::VertexBuffer(h) => self.vertex_buffers.remove(h).is_some(),
            ResourceId::VertexLayout(h) => self.vertex_layouts.remove(h).is_some(),
            ResourceId::Shader(h) => self.shaders.remove(h).is_some(),
            ResourceId::Texture(h) => self.textures.remove(h).is_some(),
            ResourceId::RenderTarget(h) => self.targets.remove(h).is_some(),
        };
        removed.then_some(Released(id))
    }
}
