use crate::backend::Backend;
use crate::renderer::RenderError;
use crate::resources::{Handle, Resources, Texture};

use super::TextureSampler;

#[derive(Debug, Clone, Default)]
struct TextureUnit {
    texture: Option<Handle<Texture>>,
    sampler: TextureSampler,
    sampler_applied: bool,
}

/// Per-unit texture and sampler bindings with a dirty-unit queue.
///
/// Setters only record state. [`flush`](Self::flush) pushes pending sampler
/// changes to the backend; [`verify_bindings`](Self::verify_bindings) repairs
/// units whose bound texture was changed behind the renderer's back.
#[derive(Debug, Clone)]
pub struct TextureUnitTable {
    units: Vec<TextureUnit>,
    /// Units touched since the last flush. May contain duplicates.
    dirty: Vec<u32>,
    max_anisotropy: u8,
    sampler_objects: bool,
}

impl TextureUnitTable {
    /// `sampler_objects` selects per-unit sampler objects over per-texture parameters.
    pub fn new(unit_count: u32, max_anisotropy: u8, sampler_objects: bool) -> Self {
        Self {
            units: vec![TextureUnit::default(); unit_count.max(1) as usize],
            dirty: Vec::new(),
            max_anisotropy: max_anisotropy.max(1),
            sampler_objects,
        }
    }

    #[inline]
    pub fn unit_count(&self) -> u32 {
        self.units.len() as u32
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    #[inline]
    pub fn dirty_units(&self) -> &[u32] {
        &self.dirty
    }

    pub fn texture(&self, unit: u32) -> Option<Handle<Texture>> {
        self.units.get(unit as usize).and_then(|u| u.texture)
    }

    pub fn sampler(&self, unit: u32) -> Option<&TextureSampler> {
        self.units.get(unit as usize).map(|u| &u.sampler)
    }

    pub fn is_sampler_applied(&self, unit: u32) -> bool {
        self.units.get(unit as usize).is_some_and(|u| u.sampler_applied)
    }

    fn unit_mut(&mut self, unit: u32) -> Result<&mut TextureUnit, RenderError> {
        let count = self.units.len();
        self.units.get_mut(unit as usize).ok_or_else(|| {
            RenderError::InvalidArgument(format!("texture unit out of range ({unit} >= {count})"))
        })
    }

    /// Binds `texture` (or nothing) to `unit`. Returns `true` when the unit changed.
    pub fn set_texture(
        &mut self,
        unit: u32,
        texture: Option<(Handle<Texture>, &Texture)>,
    ) -> Result<bool, RenderError> {
        let sampler_objects = self.sampler_objects;
        let slot = self.unit_mut(unit)?;

        let handle = texture.map(|(h, _)| h);
        if slot.texture == handle {
            return Ok(false);
        }

        slot.texture = handle;
        if let Some((_, desc)) = texture {
            // Without sampler objects the parameters live in the texture object itself.
            if slot.sampler.use_mipmaps(desc.has_mipmaps) || !sampler_objects {
                slot.sampler_applied = false;
            }
        }

        self.dirty.push(unit);
        Ok(true)
    }

    /// Replaces the sampler of `unit`. Anisotropy is clamped to the backend maximum.
    pub fn set_sampler(
        &mut self,
        unit: u32,
        sampler: TextureSampler,
        resources: &Resources,
    ) -> Result<(), RenderError> {
        let max_anisotropy = self.max_anisotropy;
        let slot = self.unit_mut(unit)?;

        slot.sampler = sampler;
        slot.sampler.anisotropy = sampler.anisotropy.clamp(1, max_anisotropy);
        slot.sampler_applied = false;

        if let Some(tex) = slot.texture.and_then(|h| resources.get(h)) {
            slot.sampler.use_mipmaps(tex.has_mipmaps);
        }

        self.dirty.push(unit);
        Ok(())
    }

    /// Drains the dirty queue, applying every pending sampler.
    pub fn flush<B: Backend>(&mut self, backend: &mut B, resources: &Resources) {
        for unit in self.dirty.drain(..) {
            let slot = &mut self.units[unit as usize];
            if slot.sampler_applied {
                continue;
            }
            let Some(tex) = slot.texture.and_then(|h| resources.get(h)) else {
                continue;
            };

            if self.sampler_objects {
                backend.bind_sampler(unit, &slot.sampler);
            } else {
                backend.apply_sampler(unit, tex.kind, tex.texture, &slot.sampler);
            }
            slot.sampler_applied = true;
        }
    }

    /// Rebinds every unit whose backend binding no longer matches. Returns the number rebound.
    pub fn verify_bindings<B: Backend>(&self, backend: &mut B, resources: &Resources) -> usize {
        let mut rebound = 0;
        for (unit, slot) in self.units.iter().enumerate() {
            let unit = unit as u32;
            let Some(tex) = slot.texture.and_then(|h| resources.get(h)) else {
                continue;
            };
            if backend.bound_texture(unit) != Some(tex.texture) {
                backend.bind_texture(unit, tex.kind, tex.texture);
                rebound += 1;
            }
        }
        rebound
    }

    /// Unbinds a released texture from every unit referencing it.
    pub fn forget_texture(&mut self, texture: Handle<Texture>) -> bool {
        let mut any = false;
        for slot in &mut self.units {
            if slot.texture == Some(texture) {
                slot.texture = None;
                slot.sampler_applied = false;
                any = true;
            }
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Call, RecordingBackend, TextureId};
    use crate::resources::TextureKind;
    use crate::textures::SamplerFilter;

    fn setup() -> (RecordingBackend, Resources, Handle<Texture>) {
        let mut resources = Resources::new();
        let tex = resources.insert(Texture::new_2d(TextureId(10), 64, 64).with_mipmaps(true));
        (RecordingBackend::new(), resources, tex)
    }

    // ── setters ───────────────────────────────────────────────────────────

    #[test]
    fn out_of_range_unit_is_rejected() {
        let (_, resources, tex) = setup();
        let mut table = TextureUnitTable::new(2, 1, true);

        let desc = resources.get(tex).unwrap();
        assert!(matches!(
            table.set_texture(2, Some((tex, desc))),
            Err(RenderError::InvalidArgument(_))
        ));
        assert!(table
            .set_sampler(5, TextureSampler::default(), &resources)
            .is_err());
        assert!(!table.is_dirty());
    }

    #[test]
    fn dirty_queue_keeps_duplicates() {
        let (_, resources, tex) = setup();
        let mut table = TextureUnitTable::new(4, 1, true);

        let desc = resources.get(tex).unwrap();
        table.set_texture(1, Some((tex, desc))).unwrap();
        table.set_sampler(1, TextureSampler::default(), &resources).unwrap();
        assert_eq!(table.dirty_units(), &[1, 1]);
    }

    #[test]
    fn same_texture_is_not_requeued() {
        let (_, resources, tex) = setup();
        let mut table = TextureUnitTable::new(1, 1, true);
        let desc = resources.get(tex).unwrap();

        assert!(table.set_texture(0, Some((tex, desc))).unwrap());
        assert!(!table.set_texture(0, Some((tex, desc))).unwrap());
        assert_eq!(table.dirty_units().len(), 1);
    }

    #[test]
    fn anisotropy_is_clamped() {
        let (_, resources, _) = setup();
        let mut table = TextureUnitTable::new(1, 4, true);
        table
            .set_sampler(0, TextureSampler::default().with_anisotropy(16), &resources)
            .unwrap();
        assert_eq!(table.sampler(0).unwrap().anisotropy, 4);
    }

    // ── flush ─────────────────────────────────────────────────────────────

    #[test]
    fn flush_binds_sampler_objects_once() {
        let (mut backend, resources, tex) = setup();
        let mut table = TextureUnitTable::new(2, 1, true);
        let desc = resources.get(tex).unwrap();

        table.set_texture(0, Some((tex, desc))).unwrap();
        table
            .set_sampler(0, TextureSampler::new(SamplerFilter::Nearest, wgpu::AddressMode::ClampToEdge), &resources)
            .unwrap();
        table.flush(&mut backend, &resources);

        let binds = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::BindSampler { unit: 0, .. }))
            .count();
        assert_eq!(binds, 1);
        assert!(table.is_sampler_applied(0));
        assert!(!table.is_dirty());
    }

    #[test]
    fn flush_applies_parameters_without_sampler_objects() {
        let (mut backend, resources, tex) = setup();
        let mut table = TextureUnitTable::new(1, 1, false);
        let desc = resources.get(tex).unwrap();

        table.set_texture(0, Some((tex, desc))).unwrap();
        table.flush(&mut backend, &resources);

        assert!(backend.calls().iter().any(|c| matches!(
            c,
            Call::ApplySampler { unit: 0, kind: TextureKind::D2, texture: TextureId(10), .. }
        )));
        assert!(!backend.calls().iter().any(|c| matches!(c, Call::BindSampler { .. })));
    }

    #[test]
    fn flush_skips_empty_units() {
        let (mut backend, resources, _) = setup();
        let mut table = TextureUnitTable::new(1, 1, true);
        table.set_sampler(0, TextureSampler::default(), &resources).unwrap();
        table.flush(&mut backend, &resources);

        assert!(backend.calls().is_empty());
        assert!(!table.is_sampler_applied(0));
    }

    // ── verification ──────────────────────────────────────────────────────

    #[test]
    fn verify_rebinds_after_external_change() {
        let (mut backend, resources, tex) = setup();
        let mut table = TextureUnitTable::new(1, 1, true);
        let desc = resources.get(tex).unwrap();
        table.set_texture(0, Some((tex, desc))).unwrap();

        assert_eq!(table.verify_bindings(&mut backend, &resources), 1);
        assert_eq!(table.verify_bindings(&mut backend, &resources), 0);

        backend.external_bind_texture(0, TextureId(99));
        assert_eq!(table.verify_bindings(&mut backend, &resources), 1);
        assert_eq!(backend.bound_texture(0), Some(TextureId(10)));
    }

    #[test]
    fn forget_texture_clears_units() {
        let (_, resources, tex) = setup();
        let mut table = TextureUnitTable::new(3, 1, true);
        let desc = resources.get(tex).unwrap();
        table.set_texture(0, Some((tex, desc))).unwrap();
        table.set_texture(2, Some((tex, desc))).unwrap();

        assert!(table.forget_texture(tex));
        assert_eq!(table.texture(0), None);
        assert_eq!(table.texture(2), None);
        assert!(!table.forget_texture(tex));
    }
}
