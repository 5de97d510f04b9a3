//! Adapters from raw geometry kernel output to [`MeshData`](crate::mesh::MeshData).
//!
//! Kernel payloads come from a trusted collaborator (the worker dispatch). A malformed
//! payload is a bug on that side, so it is reported as a [`NormalizeError`] instead of
//! being patched up. An empty result is not an error, it is reported as `None`.

mod jscad;
mod manifold;
mod occt;

pub use jscad::{JscadMesh, JscadMeshPart, NormalizedMesh, normalize_jscad};
pub use manifold::{
    ManifoldDecomposition, ManifoldGeometry, ManifoldMesh, normalize_cross_section,
    normalize_manifold, normalize_manifold_mesh,
};
pub use occt::{OcctDecomposition, OcctEdge, OcctFace, OcctShapeMesh, normalize_occt};

use crate::mesh::MeshError;
use crate::winding::{FaceSide, winding_policy};
use bitdraw_utils::{Handedness, Kernel};
use snafu::Snafu;
use tracing::trace;

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum NormalizeError {
    #[snafu(display("Malformed {} payload: {source}", kernel.name()))]
    InvalidMesh { kernel: Kernel, source: MeshError },
    #[snafu(display("Manifold payload declares {num_prop} properties per vertex, need at least 3"))]
    PropertyStride { num_prop: usize },
    #[snafu(display("Manifold property buffer of length {len} is not a multiple of {num_prop}"))]
    PropertyLength { len: usize, num_prop: usize },
}

/// Raw output of one kernel operation.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelPayload {
    Jscad(Vec<JscadMesh>),
    Occt(OcctShapeMesh),
    Occts(Vec<OcctShapeMesh>),
    Manifold(ManifoldDecomposition),
    Manifolds(Vec<ManifoldDecomposition>),
}

impl KernelPayload {
    pub fn kernel(&self) -> Kernel {
        match self {
            KernelPayload::Jscad(_) => Kernel::Jscad,
            KernelPayload::Occt(_) | KernelPayload::Occts(_) => Kernel::Occt,
            KernelPayload::Manifold(_) | KernelPayload::Manifolds(_) => Kernel::Manifold,
        }
    }
}

/// Normalized form of a [`KernelPayload`], entity by entity.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedGeometry {
    Jscad(Vec<Option<NormalizedMesh>>),
    Occt(Vec<OcctDecomposition>),
    Manifold(Vec<Option<ManifoldGeometry>>),
}

impl NormalizedGeometry {
    pub fn len(&self) -> usize {
        match self {
            NormalizedGeometry::Jscad(meshes) => meshes.len(),
            NormalizedGeometry::Occt(shapes) => shapes.len(),
            NormalizedGeometry::Manifold(decompositions) => decompositions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct MeshNormalizer {
    handedness: Handedness,
}

impl MeshNormalizer {
    pub fn new(handedness: Handedness) -> Self {
        Self { handedness }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn jscad(&self, mesh: &JscadMesh) -> Result<Option<NormalizedMesh>, NormalizeError> {
        normalize_jscad(mesh, &self.front_policy(Kernel::Jscad))
    }

    pub fn occt(&self, shape: &OcctShapeMesh) -> Result<OcctDecomposition, NormalizeError> {
        normalize_occt(shape, &self.front_policy(Kernel::Occt))
    }

    pub fn manifold(
        &self,
        decomposition: &ManifoldDecomposition,
    ) -> Result<Option<ManifoldGeometry>, NormalizeError> {
        normalize_manifold(decomposition, &self.front_policy(Kernel::Manifold))
    }

    pub fn normalize(&self, payload: &KernelPayload) -> Result<NormalizedGeometry, NormalizeError> {
        let geometry = match payload {
            KernelPayload::Jscad(meshes) => NormalizedGeometry::Jscad(
                meshes
                    .iter()
                    .map(|mesh| self.jscad(mesh))
                    .collect::<Result<_, _>>()?,
            ),
            KernelPayload::Occt(shape) => NormalizedGeometry::Occt(vec![self.occt(shape)?]),
            KernelPayload::Occts(shapes) => NormalizedGeometry::Occt(
                shapes
                    .iter()
                    .map(|shape| self.occt(shape))
                    .collect::<Result<_, _>>()?,
            ),
            KernelPayload::Manifold(decomposition) => {
                NormalizedGeometry::Manifold(vec![self.manifold(decomposition)?])
            }
            KernelPayload::Manifolds(decompositions) => NormalizedGeometry::Manifold(
                decompositions
                    .iter()
                    .map(|decomposition| self.manifold(decomposition))
                    .collect::<Result<_, _>>()?,
            ),
        };

        trace!(
            "Normalized {} payload into {} entities",
            payload.kernel().name(),
            geometry.len()
        );
        Ok(geometry)
    }

    fn front_policy(&self, kernel: Kernel) -> crate::winding::WindingPolicy {
        winding_policy(kernel, FaceSide::Front, self.handedness)
    }
}
