use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use super::{IndexBuffer, RenderTarget, Shader, Texture, VertexBuffer, VertexLayout};

/// Generational reference into an [`Arena`](super::Arena).
///
/// Equality is identity: two handles are equal only if they name the same
/// registration. A handle to a released resource never resolves again, even
/// after its slot is reused.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

// Manual impls: derives would put bounds on `T`.

impl<T> Copy for Handle<T> {}

impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> PartialOrd for Handle<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.index, self.generation).cmp(&(other.index, other.generation))
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

/// Type-erased resource identity, carried by release events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    IndexBuffer(Handle<IndexBuffer>),
    VertexBuffer(Handle<VertexBuffer>),
    VertexLayout(Handle<VertexLayout>),
    Shader(Handle<Shader>),
    Texture(Handle<Texture>),
    RenderTarget(Handle<RenderTarget>),
}

macro_rules! resource_id_from {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<Handle<$ty>> for ResourceId {
                #[inline]
                fn from(handle: Handle<$ty>) -> Self {
                    ResourceId::$ty(handle)
                }
            }
        )*
    };
}

resource_id_from!(IndexBuffer, VertexBuffer, VertexLayout, Shader, Texture, RenderTarget);

/// Emitted exactly once when a resource is released.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Released(pub ResourceId);
