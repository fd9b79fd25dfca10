use crate::resources::ShaderUniform;

/// Named matrix slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatrixKind {
    Projection,
    View,
    World,
    ViewProj,
    WorldView,
    WorldViewProj,
    InvProjection,
    InvView,
    InvWorld,
    InvViewProj,
    InvWorldView,
    InvWorldViewProj,
}

/// How a slot's value is obtained.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// Set by the caller only.
    Base,
    /// `lhs * rhs`. `affine` selects the affine-aware product.
    Product {
        lhs: MatrixKind,
        rhs: MatrixKind,
        affine: bool,
    },
    Inverse(MatrixKind),
}

impl MatrixKind {
    pub const COUNT: usize = 12;

    pub const ALL: [MatrixKind; Self::COUNT] = [
        MatrixKind::Projection,
        MatrixKind::View,
        MatrixKind::World,
        MatrixKind::ViewProj,
        MatrixKind::WorldView,
        MatrixKind::WorldViewProj,
        MatrixKind::InvProjection,
        MatrixKind::InvView,
        MatrixKind::InvWorld,
        MatrixKind::InvViewProj,
        MatrixKind::InvWorldView,
        MatrixKind::InvWorldViewProj,
    ];

    pub const fn derivation(self) -> Derivation {
        use MatrixKind::*;
        match self {
            Projection | View | World => Derivation::Base,
            ViewProj => Derivation::Product {
                lhs: View,
                rhs: Projection,
                affine: false,
            },
            WorldView => Derivation::Product {
                lhs: World,
                rhs: View,
                affine: true,
            },
            WorldViewProj => Derivation::Product {
                lhs: WorldView,
                rhs: Projection,
                affine: false,
            },
            InvProjection => Derivation::Inverse(Projection),
            InvView => Derivation::Inverse(View),
            InvWorld => Derivation::Inverse(World),
            InvViewProj => Derivation::Inverse(ViewProj),
            InvWorldView => Derivation::Inverse(WorldView),
            InvWorldViewProj => Derivation::Inverse(WorldViewProj),
        }
    }

    #[inline]
    pub const fn is_base(self) -> bool {
        matches!(self.derivation(), Derivation::Base)
    }

    /// Whether `self` is computed, directly or transitively, from `source`.
    pub fn is_derived_from(self, source: MatrixKind) -> bool {
        match self.derivation() {
            Derivation::Base => false,
            Derivation::Product { lhs, rhs, .. } => {
                lhs == source
                    || rhs == source
                    || lhs.is_derived_from(source)
                    || rhs.is_derived_from(source)
            }
            Derivation::Inverse(src) => src == source || src.is_derived_from(source),
        }
    }

    /// Slots that must be recomputed after `self` is written.
    pub fn dependents(self) -> impl Iterator<Item = MatrixKind> {
        Self::ALL.into_iter().filter(move |k| k.is_derived_from(self))
    }

    pub const fn uniform(self) -> ShaderUniform {
        match self {
            MatrixKind::Projection => ShaderUniform::ProjMatrix,
            MatrixKind::View => ShaderUniform::ViewMatrix,
            MatrixKind::World => ShaderUniform::WorldMatrix,
            MatrixKind::ViewProj => ShaderUniform::ViewProjMatrix,
            MatrixKind::WorldView => ShaderUniform::WorldViewMatrix,
            MatrixKind::WorldViewProj => ShaderUniform::WorldViewProjMatrix,
            MatrixKind::InvProjection => ShaderUniform::InvProjMatrix,
            MatrixKind::InvView => ShaderUniform::InvViewMatrix,
            MatrixKind::InvWorld => ShaderUniform::InvWorldMatrix,
            MatrixKind::InvViewProj => ShaderUniform::InvViewProjMatrix,
            MatrixKind::InvWorldView => ShaderUniform::InvWorldViewMatrix,
            MatrixKind::InvWorldViewProj => ShaderUniform::InvWorldViewProjMatrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use MatrixKind::*;

    fn dependents(kind: MatrixKind) -> Vec<MatrixKind> {
        kind.dependents().collect()
    }

    #[test]
    fn projection_dependents() {
        assert_eq!(
            dependents(Projection),
            vec![ViewProj, WorldViewProj, InvProjection, InvViewProj, InvWorldViewProj]
        );
    }

    #[test]
    fn view_dependents() {
        assert_eq!(
            dependents(View),
            vec![ViewProj, WorldView, WorldViewProj, InvView, InvViewProj, InvWorldView, InvWorldViewProj]
        );
    }

    #[test]
    fn world_dependents() {
        assert_eq!(
            dependents(World),
            vec![WorldView, WorldViewProj, InvWorld, InvWorldView, InvWorldViewProj]
        );
    }

    #[test]
    fn derived_slot_dependents() {
        assert_eq!(dependents(WorldView), vec![WorldViewProj, InvWorldView, InvWorldViewProj]);
        assert_eq!(dependents(ViewProj), vec![InvViewProj]);
        assert!(dependents(InvWorldViewProj).is_empty());
    }

    #[test]
    fn only_three_base_slots() {
        let bases: Vec<_> = MatrixKind::ALL.into_iter().filter(|k| k.is_base()).collect();
        assert_eq!(bases, vec![Projection, View, World]);
    }
}
