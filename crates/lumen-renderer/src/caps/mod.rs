//! Capability table.
//!
//! Backend feature flags and limits are probed once during setup and cached here.
//! Every optional code path consults this table instead of the backend.

use bitflags::bitflags;

use crate::backend::{AttributeClass, Backend};
use crate::renderer::RenderError;
use crate::resources::{Texture, TextureKind};

bitflags! {
    /// Optional backend features.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const ANISOTROPIC_FILTER      = 1 << 0;
        const CONDITIONAL_RENDERING   = 1 << 1;
        /// 64-bit float vertex attributes.
        const FP64_ATTRIBUTES         = 1 << 2;
        /// Integer (non-normalized) vertex attributes.
        const INTEGER_ATTRIBUTES      = 1 << 3;
        const HARDWARE_BUFFER         = 1 << 4;
        /// Instanced draws + per-instance attribute advance.
        const INSTANCING              = 1 << 5;
        const MULTIPLE_RENDER_TARGETS = 1 << 6;
        const OCCLUSION_QUERY         = 1 << 7;
        const PIXEL_BUFFER_OBJECT     = 1 << 8;
        const RENDER_TEXTURE          = 1 << 9;
        const SAMPLER_OBJECTS         = 1 << 10;
        /// Composite vertex-layout objects (vertex array objects).
        const VERTEX_ARRAY_OBJECTS    = 1 << 11;
        const TEXTURE_3D              = 1 << 12;
        const TEXTURE_CUBEMAP         = 1 << 13;
        const TEXTURE_MULTI           = 1 << 14;
        const TEXTURE_NPOT            = 1 << 15;
    }
}

/// Numeric backend limits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Limits {
    pub max_anisotropy: u8,
    pub max_color_attachments: u32,
    pub max_render_targets: u32,
    pub max_texture_size: u32,
    pub max_texture_units: u32,
    pub max_vertex_attribs: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_anisotropy: 1,
            max_color_attachments: 1,
            max_render_targets: 1,
            max_texture_size: 0,
            max_texture_units: 1,
            max_vertex_attribs: 0,
        }
    }
}

/// Raw answer of [`Backend::probe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeviceProbe {
    pub capabilities: Capabilities,
    pub limits: Limits,

    /// Shading language version as an integer (e.g. `330`).
    pub glsl_version: u32,

    /// Whether the backend ends a vertex-array build on its own.
    ///
    /// When `false`, the renderer unbinds the vertex array explicitly after a build.
    pub auto_unbinds_vertex_arrays: bool,
}

impl Default for DeviceProbe {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::empty(),
            limits: Limits::default(),
            glsl_version: 110,
            auto_unbinds_vertex_arrays: false,
        }
    }
}

/// Cached capabilities and limits for the active backend.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    probe: DeviceProbe,
    queried: bool,
}

impl CapabilityTable {
    /// Probes the backend once and normalizes the limits against the flags.
    pub fn query<B: Backend>(backend: &mut B) -> Self {
        let mut probe = backend.probe();
        let caps = probe.capabilities;
        let limits = &mut probe.limits;

        // Limits are only meaningful when the matching feature is present.
        if !caps.contains(Capabilities::ANISOTROPIC_FILTER) {
            limits.max_anisotropy = 1;
        }
        if !caps.contains(Capabilities::RENDER_TEXTURE) {
            limits.max_color_attachments = 1;
        }
        if !caps.contains(Capabilities::MULTIPLE_RENDER_TARGETS) {
            limits.max_render_targets = 1;
        }
        if !caps.contains(Capabilities::TEXTURE_MULTI) {
            limits.max_texture_units = 1;
        }
        limits.max_anisotropy = limits.max_anisotropy.max(1);
        limits.max_texture_units = limits.max_texture_units.max(1);

        log::debug!(
            "capabilities: {:?} (glsl {}, {} texture units, {} vertex attribs)",
            caps,
            probe.glsl_version,
            limits.max_texture_units,
            limits.max_vertex_attribs
        );

        Self { probe, queried: true }
    }

    /// Whether [`query`](Self::query) produced this table.
    #[inline]
    pub fn is_queried(&self) -> bool {
        self.queried
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.probe.capabilities
    }

    #[inline]
    pub fn has(&self, capability: Capabilities) -> bool {
        self.probe.capabilities.contains(capability)
    }

    /// Fails with [`RenderError::Unsupported`] when `capability` is absent.
    #[inline]
    pub fn require(&self, capability: Capabilities) -> Result<(), RenderError> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(RenderError::Unsupported(capability))
        }
    }

    /// Clears a capability after a setup step proved it unusable.
    pub fn disable(&mut self, capability: Capabilities) {
        self.probe.capabilities.remove(capability);
    }

    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.probe.limits
    }

    #[inline]
    pub fn glsl_version(&self) -> u32 {
        self.probe.glsl_version
    }

    #[inline]
    pub fn auto_unbinds_vertex_arrays(&self) -> bool {
        self.probe.auto_unbinds_vertex_arrays
    }

    /// Checks that `texture` can be bound: its kind, power-of-two sizes and the
    /// maximum texture size. A maximum of 0 means the backend reported none.
    pub fn check_texture(&self, texture: &Texture) -> Result<(), RenderError> {
        match texture.kind {
            TextureKind::D3 => self.require(Capabilities::TEXTURE_3D)?,
            TextureKind::Cubemap => self.require(Capabilities::TEXTURE_CUBEMAP)?,
            TextureKind::D2 | TextureKind::D2Array => {}
        }

        let depth = match texture.kind {
            TextureKind::D3 => texture.depth,
            _ => 1,
        };
        let dims = [texture.width, texture.height, depth];
        if !dims.iter().all(|d| d.is_power_of_two()) {
            self.require(Capabilities::TEXTURE_NPOT)?;
        }

        let max = self.probe.limits.max_texture_size;
        if max > 0 && dims.iter().any(|&d| d > max) {
            return Err(RenderError::InvalidResource(format!(
                "texture {}x{}x{} exceeds maximum size {max}",
                texture.width, texture.height, depth
            )));
        }
        Ok(())
    }

    /// Whether attributes of `class` can be declared on this backend.
    pub fn supports_attribute_class(&self, class: AttributeClass) -> bool {
        match class {
            AttributeClass::Normalized | AttributeClass::Float => true,
            AttributeClass::Double => self.has(Capabilities::FP64_ATTRIBUTES),
            AttributeClass::Integer => self.has(Capabilities::INTEGER_ATTRIBUTES),
        }
    }
}
