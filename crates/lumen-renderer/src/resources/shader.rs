use std::collections::HashMap;

use crate::backend::{Backend, ProgramId};

/// Uniforms the renderer feeds by itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderUniform {
    ProjMatrix,
    ViewMatrix,
    WorldMatrix,
    ViewProjMatrix,
    WorldViewMatrix,
    WorldViewProjMatrix,
    InvProjMatrix,
    InvViewMatrix,
    InvWorldMatrix,
    InvViewProjMatrix,
    InvWorldViewMatrix,
    InvWorldViewProjMatrix,
    TargetSize,
    InvTargetSize,
}

impl ShaderUniform {
    pub const ALL: [ShaderUniform; 14] = [
        ShaderUniform::ProjMatrix,
        ShaderUniform::ViewMatrix,
        ShaderUniform::WorldMatrix,
        ShaderUniform::ViewProjMatrix,
        ShaderUniform::WorldViewMatrix,
        ShaderUniform::WorldViewProjMatrix,
        ShaderUniform::InvProjMatrix,
        ShaderUniform::InvViewMatrix,
        ShaderUniform::InvWorldMatrix,
        ShaderUniform::InvViewProjMatrix,
        ShaderUniform::InvWorldViewMatrix,
        ShaderUniform::InvWorldViewProjMatrix,
        ShaderUniform::TargetSize,
        ShaderUniform::InvTargetSize,
    ];

    /// Identifier looked up in linked programs.
    pub const fn name(self) -> &'static str {
        match self {
            ShaderUniform::ProjMatrix => "ProjMatrix",
            ShaderUniform::ViewMatrix => "ViewMatrix",
            ShaderUniform::WorldMatrix => "WorldMatrix",
            ShaderUniform::ViewProjMatrix => "ViewProjMatrix",
            ShaderUniform::WorldViewMatrix => "WorldViewMatrix",
            ShaderUniform::WorldViewProjMatrix => "WorldViewProjMatrix",
            ShaderUniform::InvProjMatrix => "InvProjMatrix",
            ShaderUniform::InvViewMatrix => "InvViewMatrix",
            ShaderUniform::InvWorldMatrix => "InvWorldMatrix",
            ShaderUniform::InvViewProjMatrix => "InvViewProjMatrix",
            ShaderUniform::InvWorldViewMatrix => "InvWorldViewMatrix",
            ShaderUniform::InvWorldViewProjMatrix => "InvWorldViewProjMatrix",
            ShaderUniform::TargetSize => "TargetSize",
            ShaderUniform::InvTargetSize => "InvTargetSize",
        }
    }
}

/// Linked program plus the locations of the renderer-fed uniforms it exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    pub program: ProgramId,
    pub linked: bool,
    uniforms: HashMap<ShaderUniform, i32>,
}

impl Shader {
    /// Queries every [`ShaderUniform`] location from a linked program.
    pub fn from_program<B: Backend>(backend: &B, program: ProgramId) -> Self {
        let uniforms = ShaderUniform::ALL
            .iter()
            .filter_map(|&u| backend.uniform_location(program, u.name()).map(|loc| (u, loc)))
            .collect();

        Self {
            program,
            linked: true,
            uniforms,
        }
    }

    /// Program that failed to link. Binding it is rejected.
    pub fn unlinked(program: ProgramId) -> Self {
        Self {
            program,
            linked: false,
            uniforms: HashMap::new(),
        }
    }

    #[inline]
    pub fn uniform_location(&self, uniform: ShaderUniform) -> Option<i32> {
        self.uniforms.get(&uniform).copied()
    }
}
