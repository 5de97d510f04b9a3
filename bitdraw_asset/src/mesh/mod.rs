//! Canonical triangle mesh representation every kernel adapter produces.
//!
//! A [`MeshData`] is validated once when it is built and is immutable afterwards, so
//! consumers (back-face generation, the renderer) can rely on its invariants without
//! re-checking them.

pub mod generators;

use bon::bon;
use glamx::Vec3;
use itertools::Itertools;
use snafu::{Snafu, ensure};

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[snafu(display("Position buffer of length {len} is not made of xyz triples"))]
    PositionsNotTriples { len: usize },
    #[snafu(display("Index buffer of length {len} is not made of triangles"))]
    IndicesNotTriangles { len: usize },
    #[snafu(display("Index {index} is out of range for a mesh with {vertex_count} vertices"))]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[snafu(display("Normal buffer has {normals} values but positions have {positions}"))]
    NormalsLengthMismatch { normals: usize, positions: usize },
    #[snafu(display("UV buffer has {uvs} values, expected {expected}"))]
    UvLengthMismatch { uvs: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    positions: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u32>,
    uvs: Option<Vec<f32>>,
}

#[bon]
impl MeshData {
    /// Validates and builds a mesh. An empty normal buffer means "no normals".
    #[builder]
    pub fn new(
        positions: Vec<f32>,
        #[builder(default)] normals: Vec<f32>,
        indices: Vec<u32>,
        uvs: Option<Vec<f32>>,
    ) -> Result<Self, MeshError> {
        let mesh = MeshData {
            positions,
            normals,
            indices,
            uvs,
        };
        mesh.validate()?;
        Ok(mesh)
    }
}

impl MeshData {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Checks every structural invariant of the mesh.
    pub fn validate(&self) -> Result<(), MeshError> {
        ensure!(
            self.positions.len() % 3 == 0,
            PositionsNotTriplesSnafu {
                len: self.positions.len()
            }
        );
        ensure!(
            self.indices.len() % 3 == 0,
            IndicesNotTrianglesSnafu {
                len: self.indices.len()
            }
        );
        ensure!(
            self.normals.is_empty() || self.normals.len() == self.positions.len(),
            NormalsLengthMismatchSnafu {
                normals: self.normals.len(),
                positions: self.positions.len(),
            }
        );

        let vertex_count = self.vertex_count();
        if let Some(uvs) = &self.uvs {
            ensure!(
                uvs.len() == vertex_count * 2,
                UvLengthMismatchSnafu {
                    uvs: uvs.len(),
                    expected: vertex_count * 2,
                }
            );
        }

        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            return IndexOutOfRangeSnafu {
                index,
                vertex_count,
            }
            .fail();
        }

        Ok(())
    }

    /// Concatenates meshes, offsetting each mesh's indices by the number of vertices
    /// written before it. Normals and uvs survive only if every input carries them.
    pub fn merge(meshes: &[MeshData]) -> MeshData {
        let position_len = meshes.iter().map(|m| m.positions.len()).sum();
        let index_len = meshes.iter().map(|m| m.indices.len()).sum();
        let keep_normals = meshes.iter().all(MeshData::has_normals);
        let keep_uvs = meshes.iter().all(|m| m.uvs.is_some());

        let mut merged = MeshData {
            positions: Vec::with_capacity(position_len),
            normals: Vec::with_capacity(if keep_normals { position_len } else { 0 }),
            indices: Vec::with_capacity(index_len),
            uvs: keep_uvs.then(|| Vec::with_capacity(position_len / 3 * 2)),
        };
        for mesh in meshes {
            merged.extend_from(mesh, keep_normals);
        }
        merged
    }

    /// Appends `other`, offsetting its indices by the current vertex count. Normals and
    /// uvs are kept only if both meshes carry them.
    pub fn append(&mut self, other: &MeshData) {
        let first = self.positions.is_empty();
        let keep_normals = (first || self.has_normals()) && other.has_normals();
        if !keep_normals {
            self.normals.clear();
        }
        self.uvs = match self.uvs.take() {
            Some(uvs) if other.uvs.is_some() => Some(uvs),
            None if first && other.uvs.is_some() => Some(Vec::new()),
            _ => None,
        };
        self.extend_from(other, keep_normals);
    }

    fn extend_from(&mut self, other: &MeshData, keep_normals: bool) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        if keep_normals {
            self.normals.extend_from_slice(&other.normals);
        }
        if let (Some(out), Some(src)) = (self.uvs.as_mut(), other.uvs.as_ref()) {
            out.extend_from_slice(src);
        }
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Returns a copy with every normal component multiplied by `normal_sign` and, if
    /// requested, every triangle's vertex order reversed (`[a, b, c]` to `[c, b, a]`).
    pub fn reoriented(&self, normal_sign: f32, reverse_winding: bool) -> MeshData {
        let normals = self.normals.iter().map(|n| n * normal_sign).collect();
        let indices = if reverse_winding {
            self.triangles().flat_map(|[a, b, c]| [c, b, a]).collect()
        } else {
            self.indices.clone()
        };

        MeshData {
            positions: self.positions.clone(),
            normals,
            indices,
            uvs: self.uvs.clone(),
        }
    }

    /// Replaces the normals with area weighted vertex normals derived from the triangles.
    pub fn with_computed_normals(mut self) -> MeshData {
        self.normals = compute_vertex_normals(&self.positions, &self.indices);
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// A mesh without triangles has nothing to draw.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn uvs(&self) -> Option<&[f32]> {
        self.uvs.as_deref()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .iter()
            .copied()
            .tuples()
            .map(|(a, b, c)| [a, b, c])
    }

    pub fn vertex(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[index * 3..index * 3 + 3])
    }

    pub fn into_parts(self) -> (Vec<f32>, Vec<f32>, Vec<u32>, Option<Vec<f32>>) {
        (self.positions, self.normals, self.indices, self.uvs)
    }

    /// Used by kernel adapters that already checked their input.
    pub(crate) fn from_parts_unchecked(
        positions: Vec<f32>,
        normals: Vec<f32>,
        indices: Vec<u32>,
        uvs: Option<Vec<f32>>,
    ) -> MeshData {
        let mesh = MeshData {
            positions,
            normals,
            indices,
            uvs,
        };
        debug_assert_eq!(mesh.validate(), Ok(()));
        mesh
    }
}

pub fn compute_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut accumulated = vec![Vec3::ZERO; vertex_count];
    let vertex = |i: u32| Vec3::from_slice(&positions[i as usize * 3..i as usize * 3 + 3]);

    for (a, b, c) in indices.iter().copied().tuples() {
        // the cross product length is twice the triangle area, which gives the weighting
        let face = (vertex(b) - vertex(a)).cross(vertex(c) - vertex(a));
        accumulated[a as usize] += face;
        accumulated[b as usize] += face;
        accumulated[c as usize] += face;
    }

    accumulated
        .into_iter()
        .flat_map(|n| n.normalize_or_zero().to_array())
        .collect()
}
