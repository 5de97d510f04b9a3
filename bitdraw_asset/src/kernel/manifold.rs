use crate::kernel::{
    InvalidMeshSnafu, NormalizeError, PropertyLengthSnafu, PropertyStrideSnafu,
};
use crate::mesh::MeshData;
use crate::polyline::{DEFAULT_TOLERANCE, close_polyline};
use crate::winding::WindingPolicy;
use bitdraw_utils::Kernel;
use glamx::Vec3;
use snafu::{ResultExt, ensure};
use tracing::trace;

/// Mesh output of the manifold kernel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifoldMesh {
    /// Number of interleaved properties per vertex, the first three are xyz
    pub num_prop: usize,
    pub vert_properties: Vec<f32>,
    pub tri_verts: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ManifoldDecomposition {
    Manifold(ManifoldMesh),
    /// 2D polygons of a cross section
    CrossSection(Vec<Vec<[f32; 2]>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ManifoldGeometry {
    Mesh(MeshData),
    /// Closed outlines lying in the z = 0 plane
    CrossSection(Vec<Vec<Vec3>>),
}

impl ManifoldMesh {
    pub fn vertex_count(&self) -> usize {
        self.vert_properties.len().checked_div(self.num_prop).unwrap_or(0)
    }

    fn positions(&self) -> Vec<f32> {
        self.vert_properties
            .chunks_exact(self.num_prop)
            .flat_map(|props| [props[0], props[1], props[2]])
            .collect()
    }
}

pub fn normalize_manifold_mesh(
    mesh: &ManifoldMesh,
    policy: &WindingPolicy,
) -> Result<Option<MeshData>, NormalizeError> {
    if mesh.tri_verts.is_empty() {
        trace!("Manifold mesh has no triangles, nothing to draw");
        return Ok(None);
    }

    ensure!(
        mesh.num_prop >= 3,
        PropertyStrideSnafu {
            num_prop: mesh.num_prop
        }
    );
    ensure!(
        mesh.vert_properties.len() % mesh.num_prop == 0,
        PropertyLengthSnafu {
            len: mesh.vert_properties.len(),
            num_prop: mesh.num_prop,
        }
    );

    let data = MeshData::builder()
        .positions(mesh.positions())
        .indices(mesh.tri_verts.clone())
        .build()
        .context(InvalidMeshSnafu {
            kernel: Kernel::Manifold,
        })?;

    // normals are derived after the winding flip so they point out of the new front side
    Ok(Some(policy.apply(data).with_computed_normals()))
}

pub fn normalize_cross_section(polygons: &[Vec<[f32; 2]>]) -> Option<Vec<Vec<Vec3>>> {
    let outlines: Vec<Vec<Vec3>> = polygons
        .iter()
        .filter(|polygon| polygon.len() >= 2)
        .map(|polygon| {
            let points: Vec<Vec3> = polygon.iter().map(|&[x, y]| Vec3::new(x, y, 0.0)).collect();
            close_polyline(&points, DEFAULT_TOLERANCE)
        })
        .collect();

    (!outlines.is_empty()).then_some(outlines)
}

pub fn normalize_manifold(
    decomposition: &ManifoldDecomposition,
    policy: &WindingPolicy,
) -> Result<Option<ManifoldGeometry>, NormalizeError> {
    match decomposition {
        ManifoldDecomposition::Manifold(mesh) => {
            Ok(normalize_manifold_mesh(mesh, policy)?.map(ManifoldGeometry::Mesh))
        }
        ManifoldDecomposition::CrossSection(polygons) => {
            Ok(normalize_cross_section(polygons).map(ManifoldGeometry::CrossSection))
        }
    }
}
