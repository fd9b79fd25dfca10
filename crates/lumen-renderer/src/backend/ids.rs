//! Opaque backend object identifiers.
//!
//! The backend hands these out; the renderer only stores and passes them back.

macro_rules! backend_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

backend_id!(
    /// Graphics context identity. Composite vertex-layout objects are local to one context.
    ContextId
);
backend_id!(BufferId);
backend_id!(ProgramId);
backend_id!(TextureId);
backend_id!(
    /// Composite vertex-layout object (buffer bindings + attribute layout).
    VertexArrayId
);
backend_id!(FramebufferId);
backend_id!(QueryId);
