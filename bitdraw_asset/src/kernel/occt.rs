use crate::kernel::{InvalidMeshSnafu, NormalizeError};
use crate::mesh::MeshData;
use crate::winding::WindingPolicy;
use bitdraw_utils::Kernel;
use glamx::Vec3;
use snafu::ResultExt;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcctFace {
    pub face_index: usize,
    pub vertex_coord: Vec<f32>,
    pub normal_coord: Vec<f32>,
    /// Indices local to this face
    pub tri_indexes: Vec<u32>,
    pub uvs: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcctEdge {
    pub edge_index: usize,
    pub vertex_coord: Vec<[f32; 3]>,
}

/// Tessellated boundary representation as delivered by the occt kernel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcctShapeMesh {
    pub face_list: Vec<OcctFace>,
    pub edge_list: Vec<OcctEdge>,
    pub points_list: Vec<[f32; 3]>,
}

/// Faces merged into one mesh, edges and points kept apart for line and point drawing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcctDecomposition {
    /// `None` when the shape has no faces (wires, edges or vertices only)
    pub faces: Option<MeshData>,
    pub edges: Vec<Vec<Vec3>>,
    pub points: Vec<Vec3>,
}

impl OcctDecomposition {
    pub fn is_empty(&self) -> bool {
        self.faces.is_none() && self.edges.is_empty() && self.points.is_empty()
    }
}

impl OcctFace {
    fn to_mesh(&self) -> Result<MeshData, NormalizeError> {
        MeshData::builder()
            .positions(self.vertex_coord.clone())
            .normals(self.normal_coord.clone())
            .indices(self.tri_indexes.clone())
            .maybe_uvs(self.uvs.clone())
            .build()
            .context(InvalidMeshSnafu {
                kernel: Kernel::Occt,
            })
    }
}

pub fn normalize_occt(
    shape: &OcctShapeMesh,
    policy: &WindingPolicy,
) -> Result<OcctDecomposition, NormalizeError> {
    let faces: Vec<MeshData> = shape
        .face_list
        .iter()
        .map(OcctFace::to_mesh)
        .collect::<Result<_, _>>()?;

    let merged = MeshData::merge(&faces);
    let faces = if merged.is_empty() {
        None
    } else if merged.has_normals() {
        Some(policy.apply(merged))
    } else {
        Some(policy.apply(merged.with_computed_normals()))
    };

    let edges = shape
        .edge_list
        .iter()
        .map(|edge| edge.vertex_coord.iter().map(|&p| Vec3::from_array(p)).collect())
        .collect();

    let points = shape
        .points_list
        .iter()
        .map(|&p| Vec3::from_array(p))
        .collect();

    Ok(OcctDecomposition {
        faces,
        edges,
        points,
    })
}
