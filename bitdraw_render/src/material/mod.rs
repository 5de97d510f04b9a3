mod cache;

pub use cache::{DEFAULT_MAX_MATERIALS, MaterialCache, UnlitMaterialCache};

use crate::renderer::SceneRenderer;
use bitdraw_utils::{ColorError, Rgb};
use tracing::warn;

/// Everything that distinguishes one drawn material from another.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    /// `#rrggbb` hex color
    pub color: String,
    pub alpha: f32,
    /// Depth bias keeping coincident front and back faces apart
    pub z_offset: f32,
    pub unlit: bool,
}

impl MaterialSpec {
    pub fn lit(color: impl Into<String>, alpha: f32, z_offset: f32) -> Self {
        Self {
            color: color.into(),
            alpha,
            z_offset,
            unlit: false,
        }
    }

    pub fn unlit(color: impl Into<String>, alpha: f32) -> Self {
        Self {
            color: color.into(),
            alpha,
            z_offset: 0.0,
            unlit: true,
        }
    }

    pub fn rgb(&self) -> Result<Rgb, ColorError> {
        Rgb::from_hex(&self.color)
    }

    pub fn key(&self) -> MaterialKey {
        MaterialKey {
            color: self.color.clone(),
            alpha: float_key(self.alpha),
            z_offset: float_key(self.z_offset),
            unlit: self.unlit,
        }
    }
}

/// Hashable identity of a [`MaterialSpec`]. Floats are compared by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    color: String,
    alpha: u32,
    z_offset: u32,
    unlit: bool,
}

fn float_key(value: f32) -> u32 {
    // -0.0 and 0.0 describe the same material
    if value == 0.0 {
        0.0f32.to_bits()
    } else {
        value.to_bits()
    }
}

/// A material handle owned by a cache.
///
/// The cache holding this entry is the only place allowed to dispose the handle.
#[derive(Debug)]
pub struct CachedMaterial<M> {
    key: MaterialKey,
    handle: M,
}

impl<M: Clone> CachedMaterial<M> {
    pub(crate) fn new(key: MaterialKey, handle: M) -> Self {
        Self { key, handle }
    }

    pub fn key(&self) -> &MaterialKey {
        &self.key
    }

    pub fn handle(&self) -> &M {
        &self.handle
    }

    /// Disposes the handle. Failures are logged, the entry is consumed either way.
    pub fn dispose<R: SceneRenderer<Material = M>>(self, renderer: &mut R) {
        if let Err(e) = renderer.dispose_material(&self.handle) {
            warn!("Failed to dispose cached material {:?}: {e}", self.key);
        }
    }
}
