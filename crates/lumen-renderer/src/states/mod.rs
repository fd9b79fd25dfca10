//! Fixed-function pipeline state.
//!
//! [`RenderStates`] is a plain value. The renderer hands the whole snapshot to
//! the backend before every draw and clear; nothing here is diffed.

/// Toggleable pipeline parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RendererParameter {
    Blend,
    ColorWrite,
    DepthBuffer,
    DepthWrite,
    FaceCulling,
    ScissorTest,
    StencilTest,
}

impl RendererParameter {
    pub const COUNT: usize = 7;

    pub const ALL: [RendererParameter; Self::COUNT] = [
        RendererParameter::Blend,
        RendererParameter::ColorWrite,
        RendererParameter::DepthBuffer,
        RendererParameter::DepthWrite,
        RendererParameter::FaceCulling,
        RendererParameter::ScissorTest,
        RendererParameter::StencilTest,
    ];
}

/// Which polygon faces a setting applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceSide {
    Back,
    Front,
    FrontAndBack,
}

/// Stencil configuration for one face orientation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FaceStencil {
    pub compare: wgpu::CompareFunction,
    pub fail: wgpu::StencilOperation,
    pub pass: wgpu::StencilOperation,
    pub z_fail: wgpu::StencilOperation,
    pub mask: u32,
    pub reference: u32,
}

impl Default for FaceStencil {
    fn default() -> Self {
        Self {
            compare: wgpu::CompareFunction::Always,
            fail: wgpu::StencilOperation::Keep,
            pass: wgpu::StencilOperation::Keep,
            z_fail: wgpu::StencilOperation::Keep,
            mask: u32::MAX,
            reference: 0,
        }
    }
}

/// Complete fixed-function state snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderStates {
    parameters: [bool; RendererParameter::COUNT],

    pub src_blend: wgpu::BlendFactor,
    pub dst_blend: wgpu::BlendFactor,
    pub depth_func: wgpu::CompareFunction,

    /// Faces discarded when face culling is enabled.
    pub face_culling: FaceSide,
    pub face_filling: wgpu::PolygonMode,

    pub front_face: FaceStencil,
    pub back_face: FaceStencil,

    pub line_width: f32,
    pub point_size: f32,
}

impl Default for RenderStates {
    fn default() -> Self {
        let mut parameters = [false; RendererParameter::COUNT];
        parameters[RendererParameter::ColorWrite as usize] = true;
        parameters[RendererParameter::DepthWrite as usize] = true;

        Self {
            parameters,
            src_blend: wgpu::BlendFactor::One,
            dst_blend: wgpu::BlendFactor::Zero,
            depth_func: wgpu::CompareFunction::Less,
            face_culling: FaceSide::Back,
            face_filling: wgpu::PolygonMode::Fill,
            front_face: FaceStencil::default(),
            back_face: FaceStencil::default(),
            line_width: 1.0,
            point_size: 1.0,
        }
    }
}

impl RenderStates {
    #[inline]
    pub fn is_enabled(&self, parameter: RendererParameter) -> bool {
        self.parameters[parameter as usize]
    }

    #[inline]
    pub fn set_enabled(&mut self, parameter: RendererParameter, enable: bool) {
        self.parameters[parameter as usize] = enable;
    }

    /// Applies `f` to the stencil state of every face named by `side`.
    pub fn stencil_mut(&mut self, side: FaceSide, mut f: impl FnMut(&mut FaceStencil)) {
        match side {
            FaceSide::Back => f(&mut self.back_face),
            FaceSide::Front => f(&mut self.front_face),
            FaceSide::FrontAndBack => {
                f(&mut self.back_face);
                f(&mut self.front_face);
            }
        }
    }

    /// Stencil state of one face. `FrontAndBack` reads the front face.
    #[inline]
    pub fn stencil(&self, side: FaceSide) -> &FaceStencil {
        match side {
            FaceSide::Back => &self.back_face,
            FaceSide::Front | FaceSide::FrontAndBack => &self.front_face,
        }
    }
}
