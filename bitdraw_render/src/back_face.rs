//! Mirrored geometry for two-sided rendering.
//!
//! Instead of relying on a double-sided material flag, the back of a surface is drawn as
//! a second mesh with flipped normals and (for most kernels) reversed winding. Its
//! material is biased slightly behind the front face so the two never z-fight.

use crate::material::{MaterialCache, MaterialSpec};
use crate::renderer::SceneRenderer;
use bitdraw_asset::winding::{
    back_face_side_hint, skips_back_face_winding_reversal, uses_clockwise_winding,
};
use bitdraw_asset::{Kernel, MeshData, SideOrientation, WindingPolicy};
use tracing::trace;

pub const BACK_FACE_Z_BIAS: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct BackFaceRequest<'a> {
    pub meshes: &'a [MeshData],
    pub color: &'a str,
    pub opacity: f32,
    pub z_offset: f32,
    pub use_clockwise_winding: bool,
    pub skip_winding_reversal: bool,
}

impl<'a> BackFaceRequest<'a> {
    /// Request with the winding flags of `kernel`.
    pub fn for_kernel(kernel: Kernel, meshes: &'a [MeshData], color: &'a str, opacity: f32) -> Self {
        Self {
            meshes,
            color,
            opacity,
            z_offset: 0.0,
            use_clockwise_winding: uses_clockwise_winding(kernel),
            skip_winding_reversal: skips_back_face_winding_reversal(kernel),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackFace<M> {
    pub mesh: MeshData,
    pub material: M,
    pub side_hint: Option<SideOrientation>,
}

#[derive(Debug, Clone, Copy)]
pub struct BackFaceGenerator {
    z_bias: f32,
}

impl Default for BackFaceGenerator {
    fn default() -> Self {
        Self::new(BACK_FACE_Z_BIAS)
    }
}

impl BackFaceGenerator {
    pub fn new(z_bias: f32) -> Self {
        Self { z_bias }
    }

    pub fn z_bias(&self) -> f32 {
        self.z_bias
    }

    /// Returns `None` when the request holds no triangles.
    pub fn generate<R: SceneRenderer>(
        &self,
        renderer: &mut R,
        materials: &mut MaterialCache<R::Material>,
        request: &BackFaceRequest<'_>,
    ) -> Option<BackFace<R::Material>> {
        let merged = MeshData::merge(request.meshes);
        if merged.is_empty() {
            return None;
        }

        let policy = WindingPolicy {
            reverse_winding: !request.skip_winding_reversal,
            normal_sign: -1.0,
            side_hint: back_face_side_hint(renderer.handedness(), request.use_clockwise_winding),
        };

        let spec = MaterialSpec::lit(
            request.color,
            request.opacity,
            request.z_offset + self.z_bias,
        );
        let material = materials.get_or_create(renderer, &spec);

        trace!(
            "Generated back face with {} triangles, hint {:?}",
            merged.triangle_count(),
            policy.side_hint
        );

        Some(BackFace {
            mesh: policy.apply(merged),
            material,
            side_hint: policy.side_hint,
        })
    }
}
