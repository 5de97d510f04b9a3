//! Point clouds drawn as instanced sphere proxies.
//!
//! Points are grouped by color. Each group becomes one batch: a single sphere mesh with
//! one thin instance per point. A batch remembers which original point each instance
//! slot belongs to, so an update with the same number of points only rewrites the
//! transform buffers.

use crate::material::UnlitMaterialCache;
use crate::renderer::SceneRenderer;
use bitdraw_asset::mesh::generators::point_proxy_sphere;
use bitdraw_utils::debug_panic;
use glamx::{Mat4, Vec3};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace, warn};

/// Floats per instance transform (column-major 4x4)
pub const TRANSFORM_STRIDE: usize = 16;

pub const DEFAULT_POINT_SEGMENTS: u32 = 6;
pub const DEFAULT_REDUCED_POINT_SEGMENTS: u32 = 1;
pub const DEFAULT_REDUCED_DETAIL_THRESHOLD: usize = 1000;

/// Points sharing a color, in order of first appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct PointInstanceGroup {
    pub color: String,
    /// `(original index, position)` pairs
    pub points: Vec<(usize, Vec3)>,
}

/// Groups `points` by their color, keeping the order in which colors first appear.
pub fn group_by_color(points: &[Vec3], colors: &[String]) -> Vec<PointInstanceGroup> {
    if colors.len() != points.len() {
        debug_panic!(
            "Got {} colors for {} points",
            colors.len(),
            points.len()
        );
    }

    let mut groups: Vec<PointInstanceGroup> = Vec::new();
    let mut by_color: HashMap<&str, usize> = HashMap::new();

    for (index, (&point, color)) in points.iter().zip(colors).enumerate() {
        let group = *by_color.entry(color.as_str()).or_insert_with(|| {
            groups.push(PointInstanceGroup {
                color: color.clone(),
                points: Vec::new(),
            });
            groups.len() - 1
        });
        groups[group].points.push((index, point));
    }

    groups
}

fn write_translation(transforms: &mut [f32], slot: usize, position: Vec3) {
    let offset = slot * TRANSFORM_STRIDE;
    transforms[offset..offset + TRANSFORM_STRIDE]
        .copy_from_slice(&Mat4::from_translation(position).to_cols_array());
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBatch<M> {
    pub mesh: M,
    pub color: String,
    /// Original point index of every instance slot
    pub indices: Vec<usize>,
    pub transforms: Vec<f32>,
}

impl<M> InstanceBatch<M> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug)]
struct PointCloud<M> {
    point_count: usize,
    batches: Vec<InstanceBatch<M>>,
}

/// What a point cloud looks like, independent of where the points are.
#[derive(Debug, Clone, Copy)]
pub struct PointStyle {
    pub opacity: f32,
    /// Sphere proxy diameter
    pub size: f32,
    pub updatable: bool,
}

#[derive(Debug)]
pub struct PointInstancingEngine<M> {
    clouds: HashMap<M, PointCloud<M>>,
    segments: u32,
    reduced_segments: u32,
    reduced_detail_threshold: usize,
}

impl<M: Clone + Eq + Hash + Debug> Default for PointInstancingEngine<M> {
    fn default() -> Self {
        Self::new(
            DEFAULT_POINT_SEGMENTS,
            DEFAULT_REDUCED_POINT_SEGMENTS,
            DEFAULT_REDUCED_DETAIL_THRESHOLD,
        )
    }
}

impl<M: Clone + Eq + Hash + Debug> PointInstancingEngine<M> {
    pub fn new(segments: u32, reduced_segments: u32, reduced_detail_threshold: usize) -> Self {
        Self {
            clouds: HashMap::new(),
            segments,
            reduced_segments,
            reduced_detail_threshold,
        }
    }

    pub fn batch_count(&self, root: &M) -> Option<usize> {
        self.clouds.get(root).map(|cloud| cloud.batches.len())
    }

    pub fn instance_count(&self, root: &M) -> Option<usize> {
        self.clouds.get(root).map(|cloud| cloud.point_count)
    }

    pub fn batches(&self, root: &M) -> &[InstanceBatch<M>] {
        self.clouds
            .get(root)
            .map(|cloud| cloud.batches.as_slice())
            .unwrap_or_default()
    }

    /// Drops the bookkeeping of a point cloud the caller disposed.
    pub fn forget(&mut self, root: &M) -> bool {
        self.clouds.remove(root).is_some()
    }

    /// Disposes the batches of a point cloud and its root node.
    pub fn dispose<R>(&mut self, renderer: &mut R, root: &M)
    where
        R: SceneRenderer<Mesh = M>,
    {
        self.dispose_batches(renderer, root);
        if let Err(e) = renderer.dispose_mesh(root) {
            warn!("Failed to dispose point cloud {root:?}: {e}");
        }
    }

    /// Sphere tessellation for a group of `len` points.
    pub fn segments_for(&self, len: usize) -> u32 {
        if len > self.reduced_detail_threshold {
            self.reduced_segments
        } else {
            self.segments
        }
    }

    /// Draws `points` with one color per point, reusing `existing` where possible.
    ///
    /// The returned handle is the root node of the cloud. With `existing` given, the root
    /// is kept and only its batches are rebuilt or updated.
    #[profiling::function]
    pub fn create_or_update<R>(
        &mut self,
        renderer: &mut R,
        materials: &mut UnlitMaterialCache<R::Material>,
        points: &[Vec3],
        colors: &[String],
        style: PointStyle,
        existing: Option<&M>,
    ) -> M
    where
        R: SceneRenderer<Mesh = M>,
    {
        if style.updatable
            && let Some(root) = existing
            && let Some(cloud) = self.clouds.get_mut(root)
            && cloud.point_count == points.len()
        {
            trace!("Updating {} point instances in place", points.len());
            for batch in &mut cloud.batches {
                for (slot, &index) in batch.indices.iter().enumerate() {
                    write_translation(&mut batch.transforms, slot, points[index]);
                }
                renderer.update_thin_instances(&batch.mesh, &batch.transforms);
            }
            return root.clone();
        }

        let root = match existing {
            Some(root) => {
                self.dispose_batches(renderer, root);
                root.clone()
            }
            None => renderer.create_mesh_node("points"),
        };

        let groups = group_by_color(points, colors);
        debug!(
            "Building {} point batches for {} points",
            groups.len(),
            points.len()
        );

        let batches = groups
            .into_iter()
            .map(|group| self.build_batch(renderer, materials, &root, group, style))
            .collect();

        self.clouds.insert(
            root.clone(),
            PointCloud {
                point_count: points.len(),
                batches,
            },
        );

        root
    }

    fn build_batch<R>(
        &self,
        renderer: &mut R,
        materials: &mut UnlitMaterialCache<R::Material>,
        root: &M,
        group: PointInstanceGroup,
        style: PointStyle,
    ) -> InstanceBatch<M>
    where
        R: SceneRenderer<Mesh = M>,
    {
        let proxy = point_proxy_sphere(style.size, self.segments_for(group.points.len()));

        let mesh = renderer.create_mesh_node(&format!("points {}", group.color));
        renderer.apply_vertex_data(&mesh, &proxy, false);

        let material = materials.get_or_create(renderer, &group.color, style.opacity);
        renderer.assign_material(&mesh, &material);
        renderer.set_pickable(&mesh, false);
        renderer.set_parent(&mesh, Some(root));

        let mut transforms = vec![0.0; group.points.len() * TRANSFORM_STRIDE];
        let mut indices = Vec::with_capacity(group.points.len());
        for (slot, (index, position)) in group.points.into_iter().enumerate() {
            write_translation(&mut transforms, slot, position);
            indices.push(index);
        }
        renderer.create_thin_instances(&mesh, &transforms);

        InstanceBatch {
            mesh,
            color: group.color,
            indices,
            transforms,
        }
    }

    fn dispose_batches<R>(&mut self, renderer: &mut R, root: &M)
    where
        R: SceneRenderer<Mesh = M>,
    {
        let Some(cloud) = self.clouds.remove(root) else {
            return;
        };

        for batch in cloud.batches {
            if let Err(e) = renderer.dispose_mesh(&batch.mesh) {
                warn!("Failed to dispose point batch {:?}: {e}", batch.color);
            }
        }
    }
}
