/// Texture filtering mode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum SamplerFilter {
    Nearest,
    #[default]
    Bilinear,
    /// Bilinear within a level plus blending between mip levels.
    Trilinear,
}

/// Sampling parameters for one texture unit.
///
/// `mipmaps` is not user-chosen: it follows the texture bound to the unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub filter: SamplerFilter,
    pub wrap: wgpu::AddressMode,
    pub anisotropy: u8,
    mipmaps: bool,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            filter: SamplerFilter::default(),
            wrap: wgpu::AddressMode::Repeat,
            anisotropy: 1,
            mipmaps: true,
        }
    }
}

impl TextureSampler {
    #[inline]
    pub fn new(filter: SamplerFilter, wrap: wgpu::AddressMode) -> Self {
        Self {
            filter,
            wrap,
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_anisotropy(mut self, level: u8) -> Self {
        self.anisotropy = level;
        self
    }

    #[inline]
    pub fn uses_mipmaps(&self) -> bool {
        self.mipmaps
    }

    /// Records whether the bound texture has mipmaps. Returns `true` if this changed the sampler.
    #[inline]
    pub fn use_mipmaps(&mut self, mipmaps: bool) -> bool {
        let changed = self.mipmaps != mipmaps;
        self.mipmaps = mipmaps;
        changed
    }

    /// Filter actually applied, degraded to bilinear when the texture has no mip chain.
    #[inline]
    pub fn effective_filter(&self) -> SamplerFilter {
        match self.filter {
            SamplerFilter::Trilinear if !self.mipmaps => SamplerFilter::Bilinear,
            f => f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_mipmaps_reports_change() {
        let mut sampler = TextureSampler::default();
        assert!(!sampler.use_mipmaps(true));
        assert!(sampler.use_mipmaps(false));
        assert!(!sampler.uses_mipmaps());
    }

    #[test]
    fn trilinear_degrades_without_mipmaps() {
        let mut sampler = TextureSampler::new(SamplerFilter::Trilinear, wgpu::AddressMode::ClampToEdge);
        assert_eq!(sampler.effective_filter(), SamplerFilter::Trilinear);
        sampler.use_mipmaps(false);
        assert_eq!(sampler.effective_filter(), SamplerFilter::Bilinear);
    }
}
