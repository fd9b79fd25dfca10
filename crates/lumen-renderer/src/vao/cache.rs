use std::collections::{HashMap, HashSet};

use crate::backend::{Backend, ContextId, VertexArrayId};
use crate::renderer::RenderError;
use crate::resources::ResourceId;

use super::VaoKey;

#[derive(Debug, Default)]
struct ContextEntry {
    vaos: HashMap<VaoKey, VertexArrayId>,
    /// Evicted objects waiting for this context to become current.
    pending_deletes: Vec<VertexArrayId>,
}

/// Outcome of [`VaoCache::get_or_create`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(VertexArrayId),
    /// Freshly created and declared. The object is still bound.
    Built(VertexArrayId),
}

impl Lookup {
    #[inline]
    pub fn id(self) -> VertexArrayId {
        match self {
            Lookup::Hit(id) | Lookup::Built(id) => id,
        }
    }
}

/// Per-context map from [`VaoKey`] to a backend vertex array.
///
/// Vertex arrays are never shared across contexts. Each entry is registered
/// against the resources of its key; releasing any of them evicts the entry in
/// every context. Deletes aimed at a non-current context are queued until that
/// context becomes current again.
#[derive(Debug, Default)]
pub struct VaoCache {
    contexts: HashMap<ContextId, ContextEntry>,
    subscribers: HashMap<ResourceId, HashSet<(ContextId, VaoKey)>>,
}

fn subscribe(
    subscribers: &mut HashMap<ResourceId, HashSet<(ContextId, VaoKey)>>,
    context: ContextId,
    key: VaoKey,
) {
    for id in key.resources() {
        subscribers.entry(id).or_default().insert((context, key));
    }
}

fn unsubscribe(
    subscribers: &mut HashMap<ResourceId, HashSet<(ContextId, VaoKey)>>,
    context: ContextId,
    key: VaoKey,
) {
    for id in key.resources() {
        if let Some(set) = subscribers.get_mut(&id) {
            set.remove(&(context, key));
            if set.is_empty() {
                subscribers.remove(&id);
            }
        }
    }
}

impl VaoCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entries across every context.
    pub fn len(&self) -> usize {
        self.contexts.values().map(|c| c.vaos.len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len_for(&self, context: ContextId) -> usize {
        self.contexts.get(&context).map_or(0, |c| c.vaos.len())
    }

    pub fn get(&self, context: ContextId, key: &VaoKey) -> Option<VertexArrayId> {
        self.contexts.get(&context)?.vaos.get(key).copied()
    }

    pub fn pending_count(&self, context: ContextId) -> usize {
        self.contexts.get(&context).map_or(0, |c| c.pending_deletes.len())
    }

    /// Entries registered against `id`.
    pub fn subscriber_count(&self, id: ResourceId) -> usize {
        self.subscribers.get(&id).map_or(0, HashSet::len)
    }

    /// Returns the cached vertex array for `key` in `context`, building it on a miss.
    ///
    /// On a miss the new object is created and bound in the current context
    /// (which must be `context`), then `build` declares its attributes. A failed
    /// build evicts the entry and deletes the object.
    pub fn get_or_create<B, F>(
        &mut self,
        backend: &mut B,
        context: ContextId,
        key: VaoKey,
        build: F,
    ) -> Result<Lookup, RenderError>
    where
        B: Backend,
        F: FnOnce(&mut B) -> Result<(), RenderError>,
    {
        let entry = self.contexts.entry(context).or_default();
        if let Some(&vao) = entry.vaos.get(&key) {
            log::trace!("vertex array hit {:?} in {:?}", vao, context);
            return Ok(Lookup::Hit(vao));
        }

        let vao = backend.create_vertex_array()?;
        backend.bind_vertex_array(Some(vao));
        entry.vaos.insert(key, vao);
        subscribe(&mut self.subscribers, context, key);

        if let Err(err) = build(backend) {
            self.evict(context, &key);
            backend.delete_vertex_array(vao);
            log::debug!("vertex array build failed for {:?}, entry evicted", key);
            return Err(err);
        }

        log::debug!("vertex array {:?} built in {:?} for {:?}", vao, context, key);
        Ok(Lookup::Built(vao))
    }

    fn evict(&mut self, context: ContextId, key: &VaoKey) -> Option<VertexArrayId> {
        let vao = self.contexts.get_mut(&context)?.vaos.remove(key)?;
        unsubscribe(&mut self.subscribers, context, *key);
        Some(vao)
    }

    /// Evicts every entry keyed on a released resource, in every context.
    ///
    /// Objects owned by the current context are deleted now; the rest are
    /// queued on their owner. Returns the number of evicted entries.
    pub fn on_release<B: Backend>(&mut self, backend: &mut B, id: ResourceId) -> usize {
        let Some(entries) = self.subscribers.remove(&id) else {
            return 0;
        };

        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort();

        let current = backend.current_context();
        let mut evicted = 0;
        for (context, key) in entries {
            let Some(vao) = self.evict(context, &key) else {
                continue;
            };
            evicted += 1;

            if current == Some(context) {
                backend.delete_vertex_array(vao);
            } else if let Some(entry) = self.contexts.get_mut(&context) {
                entry.pending_deletes.push(vao);
            }
        }

        log::debug!("{:?} released: {} vertex array(s) evicted", id, evicted);
        evicted
    }

    /// Runs the deletes queued on the current context.
    pub fn drain_pending<B: Backend>(&mut self, backend: &mut B) -> usize {
        let Some(context) = backend.current_context() else {
            return 0;
        };
        let Some(entry) = self.contexts.get_mut(&context) else {
            return 0;
        };

        let drained = entry.pending_deletes.len();
        for vao in entry.pending_deletes.drain(..) {
            backend.delete_vertex_array(vao);
        }
        if drained > 0 {
            log::debug!("{} deferred vertex array delete(s) run in {:?}", drained, context);
        }
        drained
    }

    /// Drops everything owned by a destroyed context. No deletes are issued.
    pub fn forget_context(&mut self, context: ContextId) -> usize {
        let Some(entry) = self.contexts.remove(&context) else {
            return 0;
        };
        for key in entry.vaos.keys() {
            unsubscribe(&mut self.subscribers, context, *key);
        }
        entry.vaos.len()
    }

    /// Deletes every cached object under its owning context, then restores
    /// the previously current context.
    pub fn teardown<B: Backend>(&mut self, backend: &mut B) {
        let previous = backend.current_context();

        let mut contexts: Vec<_> = self.contexts.drain().collect();
        contexts.sort_by_key(|(id, _)| *id);

        for (context, entry) in contexts {
            if entry.vaos.is_empty() && entry.pending_deletes.is_empty() {
                continue;
            }
            if backend.current_context() != Some(context) {
                if let Err(err) = backend.make_current(context) {
                    log::warn!("skipping vertex arrays of {:?}: {}", context, err);
                    continue;
                }
            }

            let count = entry.vaos.len() + entry.pending_deletes.len();
            for vao in entry.pending_deletes.into_iter().chain(entry.vaos.into_values()) {
                backend.delete_vertex_array(vao);
            }
            log::debug!("{} vertex array(s) deleted in {:?}", count, context);
        }

        self.subscribers.clear();

        if let Some(previous) = previous {
            if backend.current_context() != Some(previous) {
                if let Err(err) = backend.make_current(previous) {
                    log::warn!("could not restore {:?}: {}", previous, err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BufferId, Call, RecordingBackend};
    use crate::resources::{IndexBuffer, Resources, VertexBuffer, VertexLayout};

    struct Fixture {
        backend: RecordingBackend,
        resources: Resources,
        key: VaoKey,
    }

    fn fixture() -> Fixture {
        let mut resources = Resources::new();
        let layout = resources.insert(VertexLayout::xy());
        let vertex_buffer = resources.insert(VertexBuffer::new(BufferId(1), layout, 4));
        let index_buffer = resources.insert(IndexBuffer::new(BufferId(2), 6, false));
        let key = VaoKey {
            index_buffer: Some(index_buffer),
            vertex_buffer,
            layout,
            instancing: None,
        };
        Fixture {
            backend: RecordingBackend::new(),
            resources,
            key,
        }
    }

    fn ok(_: &mut RecordingBackend) -> Result<(), RenderError> {
        Ok(())
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn identical_key_hits() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let ctx = f.backend.current_context().unwrap();

        let first = cache.get_or_create(&mut f.backend, ctx, f.key, ok).unwrap();
        let second = cache.get_or_create(&mut f.backend, ctx, f.key, ok).unwrap();

        assert!(matches!(first, Lookup::Built(_)));
        assert_eq!(second, Lookup::Hit(first.id()));
        assert_eq!(f.backend.count(|c| matches!(c, Call::CreateVertexArray { .. })), 1);
    }

    #[test]
    fn each_key_element_is_significant() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let ctx = f.backend.current_context().unwrap();
        let base = cache.get_or_create(&mut f.backend, ctx, f.key, ok).unwrap().id();

        let other_layout = f.resources.insert(VertexLayout::xy());
        let other_vb = f.resources.insert(VertexBuffer::new(BufferId(1), f.key.layout, 4));
        let variants = [
            VaoKey { index_buffer: None, ..f.key },
            VaoKey { vertex_buffer: other_vb, ..f.key },
            VaoKey { layout: other_layout, ..f.key },
            VaoKey { instancing: Some(other_layout), ..f.key },
        ];

        let mut ids = vec![base];
        for key in variants {
            let id = cache.get_or_create(&mut f.backend, ctx, key, ok).unwrap().id();
            assert!(!ids.contains(&id));
            ids.push(id);
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn contexts_do_not_share_entries() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let a = f.backend.current_context().unwrap();
        let b = f.backend.add_context();

        let in_a = cache.get_or_create(&mut f.backend, a, f.key, ok).unwrap().id();
        f.backend.make_current(b).unwrap();
        let in_b = cache.get_or_create(&mut f.backend, b, f.key, ok).unwrap();

        assert!(matches!(in_b, Lookup::Built(_)));
        assert_ne!(in_a, in_b.id());
        assert_eq!(cache.len_for(a), 1);
        assert_eq!(cache.len_for(b), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_build_evicts_entry() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let ctx = f.backend.current_context().unwrap();

        let err = cache
            .get_or_create(&mut f.backend, ctx, f.key, |_| {
                Err(RenderError::InvalidArgument("bad layout".into()))
            })
            .unwrap_err();

        assert!(matches!(err, RenderError::InvalidArgument(_)));
        assert!(cache.is_empty());
        assert_eq!(cache.subscriber_count(f.key.vertex_buffer.into()), 0);
        assert_eq!(f.backend.live_vertex_arrays(), 0);
    }

    // ── release ───────────────────────────────────────────────────────────

    #[test]
    fn release_evicts_in_every_context() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let a = f.backend.current_context().unwrap();
        let b = f.backend.add_context();

        cache.get_or_create(&mut f.backend, a, f.key, ok).unwrap();
        f.backend.make_current(b).unwrap();
        cache.get_or_create(&mut f.backend, b, f.key, ok).unwrap();

        let evicted = cache.on_release(&mut f.backend, f.key.vertex_buffer.into());
        assert_eq!(evicted, 2);
        assert!(cache.is_empty());

        // Owned by `b` (current): deleted now. Owned by `a`: queued.
        assert_eq!(cache.pending_count(a), 1);
        assert_eq!(cache.pending_count(b), 0);
        assert_eq!(f.backend.foreign_deletes(), 0);

        // Other key resources no longer point at the evicted entries.
        assert_eq!(cache.subscriber_count(f.key.layout.into()), 0);
    }

    #[test]
    fn deferred_delete_runs_under_owner() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let a = f.backend.current_context().unwrap();
        let b = f.backend.add_context();

        cache.get_or_create(&mut f.backend, a, f.key, ok).unwrap();
        f.backend.make_current(b).unwrap();
        cache.on_release(&mut f.backend, f.key.layout.into());

        assert_eq!(cache.drain_pending(&mut f.backend), 0);
        assert_eq!(f.backend.live_vertex_arrays(), 1);

        f.backend.make_current(a).unwrap();
        assert_eq!(cache.drain_pending(&mut f.backend), 1);
        assert_eq!(f.backend.live_vertex_arrays(), 0);
        assert_eq!(f.backend.foreign_deletes(), 0);
    }

    #[test]
    fn release_then_rebuild_with_remaining_elements() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let ctx = f.backend.current_context().unwrap();
        let old = cache.get_or_create(&mut f.backend, ctx, f.key, ok).unwrap().id();

        cache.on_release(&mut f.backend, f.key.vertex_buffer.into());
        let fresh_vb = f.resources.insert(VertexBuffer::new(BufferId(9), f.key.layout, 4));
        let key = VaoKey { vertex_buffer: fresh_vb, ..f.key };

        let rebuilt = cache.get_or_create(&mut f.backend, ctx, key, ok).unwrap();
        assert!(matches!(rebuilt, Lookup::Built(_)));
        assert_ne!(rebuilt.id(), old);
    }

    #[test]
    fn unrelated_release_is_noop() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let ctx = f.backend.current_context().unwrap();
        cache.get_or_create(&mut f.backend, ctx, f.key, ok).unwrap();

        let stray = f.resources.insert(VertexLayout::xy());
        assert_eq!(cache.on_release(&mut f.backend, stray.into()), 0);
        assert_eq!(cache.len(), 1);
    }

    // ── context lifetime ──────────────────────────────────────────────────

    #[test]
    fn forget_context_drops_without_deletes() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let ctx = f.backend.current_context().unwrap();
        cache.get_or_create(&mut f.backend, ctx, f.key, ok).unwrap();
        f.backend.clear_calls();

        assert_eq!(cache.forget_context(ctx), 1);
        assert!(cache.is_empty());
        assert_eq!(cache.subscriber_count(f.key.vertex_buffer.into()), 0);
        assert!(f.backend.calls().is_empty());
    }

    #[test]
    fn teardown_deletes_under_each_owner() {
        let mut f = fixture();
        let mut cache = VaoCache::new();
        let a = f.backend.current_context().unwrap();
        let b = f.backend.add_context();

        cache.get_or_create(&mut f.backend, a, f.key, ok).unwrap();
        f.backend.make_current(b).unwrap();
        cache.get_or_create(&mut f.backend, b, f.key, ok).unwrap();
        let other = VaoKey { index_buffer: None, ..f.key };
        cache.get_or_create(&mut f.backend, b, other, ok).unwrap();

        cache.teardown(&mut f.backend);

        assert!(cache.is_empty());
        assert_eq!(f.backend.live_vertex_arrays(), 0);
        assert_eq!(f.backend.foreign_deletes(), 0);
        assert_eq!(f.backend.current_context(), Some(b));
    }
}
