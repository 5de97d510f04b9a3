use crate::kernel::{InvalidMeshSnafu, NormalizeError};
use crate::mesh::MeshData;
use crate::winding::WindingPolicy;
use bitdraw_utils::{Kernel, Rgb};
use glamx::{Mat4, Vec3};
use itertools::Itertools;
use snafu::ResultExt;

/// One polygon soup of a solid, with its local transform.
#[derive(Debug, Clone, PartialEq)]
pub struct JscadMeshPart {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    /// Column-major 4x4 local transform
    pub transforms: [f32; 16],
}

/// A single drawable solid or polygon mesh produced by the jscad kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct JscadMesh {
    pub parts: Vec<JscadMeshPart>,
    /// Color baked into the solid (rgb or rgba, `0.0..=1.0`)
    pub color: Option<Vec<f32>>,
}

/// Mesh ready for drawing, plus the color the kernel baked into it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMesh {
    pub mesh: MeshData,
    pub baked_color: Option<String>,
}

impl JscadMeshPart {
    pub fn untransformed(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            indices,
            transforms: Mat4::IDENTITY.to_cols_array(),
        }
    }

    fn to_mesh(&self) -> Result<MeshData, NormalizeError> {
        let transform = Mat4::from_cols_array(&self.transforms);
        let (positions, normals) = if transform == Mat4::IDENTITY {
            (self.positions.clone(), self.normals.clone())
        } else {
            let normal_matrix = transform.inverse().transpose();
            let positions = transform_triples(&self.positions, |p| transform.transform_point3(p));
            let normals = transform_triples(&self.normals, |n| {
                normal_matrix.transform_vector3(n).normalize_or_zero()
            });
            (positions, normals)
        };

        MeshData::builder()
            .positions(positions)
            .normals(normals)
            .indices(self.indices.clone())
            .build()
            .context(InvalidMeshSnafu {
                kernel: Kernel::Jscad,
            })
    }
}

fn transform_triples(values: &[f32], f: impl Fn(Vec3) -> Vec3) -> Vec<f32> {
    // a trailing partial triple is left for validation to reject
    let mut out: Vec<f32> = values
        .iter()
        .copied()
        .tuples()
        .flat_map(|(x, y, z)| f(Vec3::new(x, y, z)).to_array())
        .collect();
    out.extend_from_slice(&values[values.len() - values.len() % 3..]);
    out
}

/// Concatenates the parts of a jscad mesh into one [`MeshData`].
///
/// Returns `None` when the solid has no triangles.
pub fn normalize_jscad(
    mesh: &JscadMesh,
    policy: &WindingPolicy,
) -> Result<Option<NormalizedMesh>, NormalizeError> {
    let parts: Vec<MeshData> = mesh
        .parts
        .iter()
        .map(JscadMeshPart::to_mesh)
        .collect::<Result<_, _>>()?;

    let merged = MeshData::merge(&parts);
    if merged.is_empty() {
        return Ok(None);
    }

    let merged = if merged.has_normals() {
        merged
    } else {
        merged.with_computed_normals()
    };

    Ok(Some(NormalizedMesh {
        mesh: policy.apply(merged),
        baked_color: mesh
            .color
            .as_deref()
            .map(|channels| Rgb::from_channels(channels).to_hex()),
    }))
}
