use crate::backend::Backend;
use crate::coords::Matrix4;
use crate::resources::Shader;

use super::{Derivation, MatrixKind};

/// One matrix slot: value, freshness and uniform location in the bound program.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MatrixSlot {
    pub value: Matrix4,
    /// `false` means stale; recomputed on next read.
    pub updated: bool,
    pub location: Option<i32>,
}

impl Default for MatrixSlot {
    fn default() -> Self {
        Self {
            value: Matrix4::identity(),
            updated: true,
            location: None,
        }
    }
}

/// Lazy dependency graph over the twelve matrix slots.
///
/// Writes invalidate dependents eagerly; reads recompute lazily and memoize.
#[derive(Debug, Clone, Default)]
pub struct MatrixCache {
    slots: [MatrixSlot; MatrixKind::COUNT],
    inversion_failures: u64,
}

impl MatrixCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to identity everywhere, locations dropped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn slot(&self, kind: MatrixKind) -> &MatrixSlot {
        &self.slots[kind as usize]
    }

    #[inline]
    pub fn is_updated(&self, kind: MatrixKind) -> bool {
        self.slots[kind as usize].updated
    }

    #[inline]
    pub fn location(&self, kind: MatrixKind) -> Option<i32> {
        self.slots[kind as usize].location
    }

    /// Singular matrices met while computing inverse slots.
    #[inline]
    pub fn inversion_failures(&self) -> u64 {
        self.inversion_failures
    }

    /// Stores `value` and invalidates every slot derived from `kind`.
    pub fn set(&mut self, kind: MatrixKind, value: Matrix4) {
        let slot = &mut self.slots[kind as usize];
        slot.value = value;
        slot.updated = true;

        for dependent in kind.dependents() {
            self.slots[dependent as usize].updated = false;
        }
    }

    /// Current value of `kind`, recomputing stale sources first.
    pub fn get(&mut self, kind: MatrixKind) -> Matrix4 {
        self.ensure(kind);
        self.slots[kind as usize].value
    }

    fn ensure(&mut self, kind: MatrixKind) {
        if self.slots[kind as usize].updated {
            return;
        }

        match kind.derivation() {
            Derivation::Base => {}
            Derivation::Product { lhs, rhs, affine } => {
                let a = self.get(lhs);
                let b = self.get(rhs);
                self.slots[kind as usize].value = if affine {
                    a.concatenate_affine(&b)
                } else {
                    a.concatenate(&b)
                };
            }
            Derivation::Inverse(source) => {
                let src = self.get(source);
                match src.inverse() {
                    Some(inv) => self.slots[kind as usize].value = inv,
                    None => {
                        // Previous inverse stays in place.
                        self.inversion_failures += 1;
                        log::warn!("failed to invert {:?} matrix (singular)", source);
                    }
                }
            }
        }

        self.slots[kind as usize].updated = true;
    }

    /// Looks every slot's uniform up in `shader`. Returns how many were found.
    pub fn resolve_locations(&mut self, shader: &Shader) -> usize {
        let mut found = 0;
        for kind in MatrixKind::ALL {
            let location = shader.uniform_location(kind.uniform());
            found += usize::from(location.is_some());
            self.slots[kind as usize].location = location;
        }
        found
    }

    /// Sends every located slot, recomputing stale ones. Returns how many were sent.
    pub fn flush<B: Backend>(&mut self, backend: &mut B) -> usize {
        let mut sent = 0;
        for kind in MatrixKind::ALL {
            let Some(location) = self.slots[kind as usize].location else {
                continue;
            };
            let value = self.get(kind);
            backend.send_matrix(location, &value);
            sent += 1;
        }
        sent
    }
}
