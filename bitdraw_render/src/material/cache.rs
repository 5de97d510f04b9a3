//! Bounded material caches.
//!
//! Drawing thousands of entities with a handful of colors must not create thousands of
//! materials. Both caches hand out one material per distinct [`MaterialSpec`] and evict
//! the oldest entry once `max_materials` is reached.
//!
//! A material disposed behind the cache's back (the host tearing down its scene, for
//! example) is dropped from the map on the next cache miss and recreated when asked for. The
//! caches never return a handle the renderer reports as disposed.

use crate::material::{CachedMaterial, MaterialKey, MaterialSpec};
use crate::renderer::SceneRenderer;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace, warn};

pub const DEFAULT_MAX_MATERIALS: usize = 500;

#[derive(Debug)]
pub struct MaterialCache<M> {
    entries: HashMap<MaterialKey, CachedMaterial<M>>,
    /// Keys in insertion order, oldest first
    order: VecDeque<MaterialKey>,
    max_materials: usize,
    created: usize,
}

impl<M: Clone> Default for MaterialCache<M> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MATERIALS)
    }
}

impl<M: Clone> MaterialCache<M> {
    pub fn new(max_materials: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_materials: max_materials.max(1),
            created: 0,
        }
    }

    /// Entries held. Handles disposed behind the cache's back are counted until the next
    /// cache miss or [`Self::purge_disposed`].
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_materials(&self) -> usize {
        self.max_materials
    }

    /// Number of materials created since construction or the last [`Self::dispose_all`].
    pub fn created(&self) -> usize {
        self.created
    }

    /// Whether a live material for `spec` is cached.
    pub fn contains<R>(&self, renderer: &R, spec: &MaterialSpec) -> bool
    where
        R: SceneRenderer<Material = M>,
    {
        self.entries
            .get(&spec.key())
            .is_some_and(|entry| !renderer.is_material_disposed(entry.handle()))
    }

    /// Drops every entry whose handle was disposed outside of the cache. The handles are
    /// not disposed again. Returns the number of dropped entries.
    pub fn purge_disposed<R>(&mut self, renderer: &R) -> usize
    where
        R: SceneRenderer<Material = M>,
    {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !renderer.is_material_disposed(entry.handle()));

        let purged = before - self.entries.len();
        if purged > 0 {
            warn!("Dropped {purged} cached materials disposed outside of their cache");
            let entries = &self.entries;
            self.order.retain(|key| entries.contains_key(key));
        }
        purged
    }

    pub fn get_or_create<R>(&mut self, renderer: &mut R, spec: &MaterialSpec) -> M
    where
        R: SceneRenderer<Material = M>,
    {
        self.get_or_create_with(renderer, spec, |renderer, spec| {
            renderer.create_material(spec)
        })
    }

    /// Like [`Self::get_or_create`], with a custom constructor for cache misses.
    pub fn get_or_create_with<R, F>(&mut self, renderer: &mut R, spec: &MaterialSpec, create: F) -> M
    where
        R: SceneRenderer<Material = M>,
        F: FnOnce(&mut R, &MaterialSpec) -> M,
    {
        let key = spec.key();

        if let Some(entry) = self.entries.get(&key)
            && !renderer.is_material_disposed(entry.handle())
        {
            trace!("Material cache hit for {key:?}");
            return entry.handle().clone();
        }

        // every stale key goes, not only the one looked up
        self.purge_disposed(renderer);

        while self.entries.len() >= self.max_materials {
            if !self.evict_oldest(renderer) {
                break;
            }
        }

        let handle = create(renderer, spec);
        self.created += 1;
        trace!("Created material #{} for {key:?}", self.created);

        self.order.push_back(key.clone());
        self.entries
            .insert(key.clone(), CachedMaterial::new(key, handle.clone()));

        handle
    }

    fn evict_oldest<R>(&mut self, renderer: &mut R) -> bool
    where
        R: SceneRenderer<Material = M>,
    {
        let Some(oldest) = self.order.pop_front() else {
            return false;
        };

        debug!("Material cache is full, evicting {oldest:?}");
        if let Some(entry) = self.entries.remove(&oldest) {
            entry.dispose(renderer);
        }
        true
    }

    /// Disposes every cached material and resets the cache.
    pub fn dispose_all<R>(&mut self, renderer: &mut R)
    where
        R: SceneRenderer<Material = M>,
    {
        debug!("Disposing {} cached materials", self.entries.len());
        for key in self.order.drain(..) {
            if let Some(entry) = self.entries.remove(&key) {
                entry.dispose(renderer);
            }
        }

        if !self.entries.is_empty() {
            bitdraw_utils::debug_panic!("Material cache order and entries desynchronized");
            for (_, entry) in self.entries.drain() {
                entry.dispose(renderer);
            }
        }

        self.created = 0;
    }
}

/// Material cache for points and lines. Unlit, and without a depth bias dimension.
#[derive(Debug)]
pub struct UnlitMaterialCache<M>(MaterialCache<M>);

impl<M: Clone> Default for UnlitMaterialCache<M> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MATERIALS)
    }
}

impl<M: Clone> UnlitMaterialCache<M> {
    pub fn new(max_materials: usize) -> Self {
        Self(MaterialCache::new(max_materials))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn created(&self) -> usize {
        self.0.created()
    }

    pub fn contains<R>(&self, renderer: &R, color: &str, alpha: f32) -> bool
    where
        R: SceneRenderer<Material = M>,
    {
        self.0.contains(renderer, &MaterialSpec::unlit(color, alpha))
    }

    pub fn purge_disposed<R>(&mut self, renderer: &R) -> usize
    where
        R: SceneRenderer<Material = M>,
    {
        self.0.purge_disposed(renderer)
    }

    pub fn get_or_create<R>(&mut self, renderer: &mut R, color: &str, alpha: f32) -> M
    where
        R: SceneRenderer<Material = M>,
    {
        self.0
            .get_or_create(renderer, &MaterialSpec::unlit(color, alpha))
    }

    pub fn dispose_all<R>(&mut self, renderer: &mut R)
    where
        R: SceneRenderer<Material = M>,
    {
        self.0.dispose_all(renderer);
    }
}
