//! The scene renderer collaborator.
//!
//! The draw engine owns no scene state of its own. Everything it needs from the host
//! renderer goes through [`SceneRenderer`].

use crate::material::MaterialSpec;
use bitdraw_asset::{MeshData, SideOrientation};
use bitdraw_utils::Handedness;
use glamx::Vec3;
use snafu::Snafu;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
pub enum DisposeError {
    #[snafu(display("The resource was already disposed"))]
    AlreadyDisposed,
    #[snafu(display("The renderer refused to dispose the resource: {message}"))]
    Refused { message: String },
}

/// Thick line geometry handed to [`SceneRenderer::create_thick_lines`].
#[derive(Debug, Clone, Copy)]
pub struct ThickLines<'a> {
    /// Explicit segment pairs, every two points form an independent segment
    pub segments: &'a [Vec3],
    pub width: f32,
    pub updatable: bool,
}

pub trait SceneRenderer {
    /// Scene node handle. The engine only references nodes, the renderer owns them.
    type Mesh: Clone + Eq + Hash + Debug;
    type Material: Clone + PartialEq + Debug;

    fn handedness(&self) -> Handedness;

    fn create_mesh_node(&mut self, name: &str) -> Self::Mesh;
    fn apply_vertex_data(&mut self, mesh: &Self::Mesh, data: &MeshData, updatable: bool);

    fn create_material(&mut self, spec: &MaterialSpec) -> Self::Material;
    /// True when the material was disposed by someone other than the material caches.
    fn is_material_disposed(&self, material: &Self::Material) -> bool;
    fn assign_material(&mut self, mesh: &Self::Mesh, material: &Self::Material);

    fn set_side_orientation(&mut self, mesh: &Self::Mesh, orientation: SideOrientation);
    fn set_visibility(&mut self, mesh: &Self::Mesh, visible: bool);
    fn set_pickable(&mut self, mesh: &Self::Mesh, pickable: bool);
    fn set_parent(&mut self, child: &Self::Mesh, parent: Option<&Self::Mesh>);

    fn dispose_mesh(&mut self, mesh: &Self::Mesh) -> Result<(), DisposeError>;
    fn dispose_material(&mut self, material: &Self::Material) -> Result<(), DisposeError>;

    /// Turns `mesh` into an instanced primitive. `transforms` holds one column-major
    /// 4x4 matrix (16 floats) per instance.
    fn create_thin_instances(&mut self, mesh: &Self::Mesh, transforms: &[f32]);
    fn update_thin_instances(&mut self, mesh: &Self::Mesh, transforms: &[f32]);

    /// Creates a thick line mesh, or rewrites `existing` in place when given.
    /// The returned handle supersedes `existing`.
    fn create_thick_lines(
        &mut self,
        name: &str,
        lines: ThickLines<'_>,
        existing: Option<&Self::Mesh>,
    ) -> Self::Mesh;
}
