//! The draw engine.
//!
//! Every draw call runs the same pipeline: normalize the kernel payload, resolve colors,
//! fetch materials from the caches, generate back faces and finally hand the result to
//! the renderer. Draw calls return the root node of what they drew. Passing that root
//! back as `existing` redraws into it instead of creating a new node.

use crate::back_face::{BackFaceGenerator, BackFaceRequest};
use crate::config::DrawConfig;
use crate::dispatch::{self, DispatchError, WorkerDispatch};
use crate::lines::{LineEngine, LineStyle};
use crate::material::{MaterialCache, MaterialSpec, UnlitMaterialCache};
use crate::options::{
    DEFAULT_FACE_COLOR, DrawBasicGeometryOptions, DrawManifoldOrCrossSectionOptions,
    DrawOcctShapeOptions, DrawPointsOptions, DrawPolylinesOptions,
};
use crate::points::{PointInstancingEngine, PointStyle};
use crate::renderer::SceneRenderer;
use bitdraw_asset::color_map::{apply_baked, resolve};
use bitdraw_asset::kernel::{
    JscadMesh, ManifoldDecomposition, ManifoldGeometry, NormalizedMesh, OcctShapeMesh,
};
use bitdraw_asset::{Kernel, MeshData, MeshNormalizer, NormalizeError};
use bitdraw_utils::{ColorError, Rgb};
use glamx::Vec3;
use itertools::Itertools;
use snafu::Snafu;
use std::collections::HashMap;
use std::slice;
use tracing::{trace, warn};

#[derive(Debug, Snafu)]
pub enum DrawError {
    #[snafu(transparent)]
    Normalize { source: NormalizeError },
    #[snafu(transparent)]
    Color { source: ColorError },
    #[snafu(transparent)]
    Dispatch { source: DispatchError },
}

/// A drawn surface: the front mesh and its optional mirrored back.
#[derive(Debug, Clone)]
struct DrawnSurface<M> {
    front: M,
    back: Option<M>,
}

/// Children of a root node returned by a draw call.
#[derive(Debug, Clone)]
struct DrawnShape<M> {
    surfaces: Vec<DrawnSurface<M>>,
    edges: Option<M>,
    vertices: Option<M>,
}

impl<M> Default for DrawnShape<M> {
    fn default() -> Self {
        Self {
            surfaces: Vec::new(),
            edges: None,
            vertices: None,
        }
    }
}

struct SurfaceStyle<'a> {
    kernel: Kernel,
    opacity: f32,
    two_sided: bool,
    back_face_color: &'a str,
    back_face_opacity: f32,
    updatable: bool,
}

fn check_colors<'a>(colors: impl IntoIterator<Item = &'a str>) -> Result<(), ColorError> {
    colors
        .into_iter()
        .unique()
        .try_for_each(|color| Rgb::from_hex(color).map(|_| ()))
}

fn dispose_node<R: SceneRenderer>(renderer: &mut R, node: &R::Mesh) {
    if let Err(e) = renderer.dispose_mesh(node) {
        warn!("Failed to dispose scene node {node:?}: {e}");
    }
}

pub struct DrawEngine<R: SceneRenderer> {
    config: DrawConfig,
    materials: MaterialCache<R::Material>,
    unlit_materials: UnlitMaterialCache<R::Material>,
    back_faces: BackFaceGenerator,
    points: PointInstancingEngine<R::Mesh>,
    lines: LineEngine<R::Mesh>,
    shapes: HashMap<R::Mesh, DrawnShape<R::Mesh>>,
}

impl<R: SceneRenderer> Default for DrawEngine<R> {
    fn default() -> Self {
        Self::new(DrawConfig::default())
    }
}

impl<R: SceneRenderer> DrawEngine<R> {
    pub fn new(config: DrawConfig) -> Self {
        Self {
            config,
            materials: MaterialCache::new(config.max_materials),
            unlit_materials: UnlitMaterialCache::new(config.max_materials),
            back_faces: BackFaceGenerator::new(config.back_face_z_bias),
            points: PointInstancingEngine::new(
                config.point_segments,
                config.reduced_point_segments,
                config.point_detail_threshold,
            ),
            lines: LineEngine::default(),
            shapes: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn materials(&self) -> &MaterialCache<R::Material> {
        &self.materials
    }

    pub fn unlit_materials(&self) -> &UnlitMaterialCache<R::Material> {
        &self.unlit_materials
    }

    pub fn points(&self) -> &PointInstancingEngine<R::Mesh> {
        &self.points
    }

    pub fn lines(&self) -> &LineEngine<R::Mesh> {
        &self.lines
    }

    /// Front and back nodes of every surface drawn under `root`.
    pub fn surfaces(&self, root: &R::Mesh) -> Vec<(R::Mesh, Option<R::Mesh>)> {
        self.shapes
            .get(root)
            .map(|shape| {
                shape
                    .surfaces
                    .iter()
                    .map(|s| (s.front.clone(), s.back.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Edge and vertex child nodes drawn under `root`.
    pub fn shape_children(&self, root: &R::Mesh) -> (Option<R::Mesh>, Option<R::Mesh>) {
        self.shapes
            .get(root)
            .map(|shape| (shape.edges.clone(), shape.vertices.clone()))
            .unwrap_or_default()
    }

    #[profiling::function]
    pub fn draw_jscad_meshes(
        &mut self,
        renderer: &mut R,
        meshes: &[JscadMesh],
        options: &DrawBasicGeometryOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<Option<R::Mesh>, DrawError> {
        let normalizer = MeshNormalizer::new(renderer.handedness());
        let normalized: Vec<Option<NormalizedMesh>> = meshes
            .iter()
            .map(|mesh| normalizer.jscad(mesh))
            .collect::<Result<_, _>>()?;

        if normalized.iter().all(Option::is_none) {
            trace!("Nothing to draw for {} jscad meshes", meshes.len());
            return Ok(None);
        }

        // colors map onto the requested entities, empty ones included
        let mut colors = resolve(
            &options.colors,
            normalized.len(),
            options.color_map_strategy,
            DEFAULT_FACE_COLOR,
        );
        let baked: Vec<Option<String>> = normalized
            .iter()
            .map(|mesh| mesh.as_ref().and_then(|mesh| mesh.baked_color.clone()))
            .collect();
        apply_baked(&mut colors, &baked);

        let (meshes, colors): (Vec<MeshData>, Vec<String>) = normalized
            .into_iter()
            .zip(colors)
            .filter_map(|(mesh, color)| mesh.map(|mesh| (mesh.mesh, color)))
            .unzip();
        check_colors(
            colors
                .iter()
                .map(String::as_str)
                .chain([options.back_face_color.as_str()]),
        )?;

        let style = SurfaceStyle {
            kernel: Kernel::Jscad,
            opacity: options.opacity,
            two_sided: options.draw_two_sided,
            back_face_color: &options.back_face_color,
            back_face_opacity: options.back_face_opacity,
            updatable: options.updatable,
        };

        let (root, previous) = self.take_root(renderer, "jscad meshes", existing);
        self.dispose_lines_and_points(renderer, &previous);
        let surfaces =
            self.draw_surfaces(renderer, &root, &meshes, &colors, &style, previous.surfaces);

        let shape = DrawnShape {
            surfaces,
            ..DrawnShape::default()
        };
        Ok(Some(self.finish(renderer, root, shape, options.hidden)))
    }

    /// Draws the faces, edges and vertices of a boundary representation shape.
    ///
    /// Returns `None` only when the shape has nothing at all. A shape without faces still
    /// draws its edges and vertices.
    #[profiling::function]
    pub fn draw_occt_shape(
        &mut self,
        renderer: &mut R,
        shape: &OcctShapeMesh,
        options: &DrawOcctShapeOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<Option<R::Mesh>, DrawError> {
        let decomposition = MeshNormalizer::new(renderer.handedness()).occt(shape)?;
        if decomposition.is_empty() {
            trace!("Occt shape has no faces, edges or points");
            return Ok(None);
        }

        check_colors([
            options.face_color.as_str(),
            options.edge_color.as_str(),
            options.vertex_color.as_str(),
            options.back_face_color.as_str(),
        ])?;

        let (root, previous) = self.take_root(renderer, "occt shape", existing);

        let surfaces = match &decomposition.faces {
            Some(faces) if options.draw_faces => {
                let style = SurfaceStyle {
                    kernel: Kernel::Occt,
                    opacity: options.face_opacity,
                    two_sided: options.draw_two_sided,
                    back_face_color: &options.back_face_color,
                    back_face_opacity: options.back_face_opacity,
                    updatable: options.updatable,
                };
                self.draw_surfaces(
                    renderer,
                    &root,
                    slice::from_ref(faces),
                    slice::from_ref(&options.face_color),
                    &style,
                    previous.surfaces,
                )
            }
            _ => {
                self.dispose_surfaces(renderer, previous.surfaces);
                Vec::new()
            }
        };

        let edges = if options.draw_edges {
            let colors = vec![options.edge_color.clone(); decomposition.edges.len()];
            let style = LineStyle {
                width: options.edge_width,
                opacity: options.edge_opacity,
                closed: false,
                updatable: options.updatable,
                tolerance: self.config.polyline_tolerance,
            };
            self.lines.draw(
                renderer,
                &mut self.unlit_materials,
                &decomposition.edges,
                &colors,
                style,
                previous.edges.as_ref(),
            )
        } else {
            None
        };
        self.attach_or_release_lines(renderer, &root, edges.as_ref(), previous.edges);

        let vertices = if options.draw_vertices && !decomposition.points.is_empty() {
            let colors = vec![options.vertex_color.clone(); decomposition.points.len()];
            let style = PointStyle {
                opacity: 1.0,
                size: options.vertex_size,
                updatable: options.updatable,
            };
            Some(self.points.create_or_update(
                renderer,
                &mut self.unlit_materials,
                &decomposition.points,
                &colors,
                style,
                previous.vertices.as_ref(),
            ))
        } else {
            None
        };
        self.attach_or_release_points(renderer, &root, vertices.as_ref(), previous.vertices);

        let shape = DrawnShape {
            surfaces,
            edges,
            vertices,
        };
        Ok(Some(self.finish(renderer, root, shape, options.hidden)))
    }

    /// Draws every shape into its own root node.
    pub fn draw_occt_shapes(
        &mut self,
        renderer: &mut R,
        shapes: &[OcctShapeMesh],
        options: &DrawOcctShapeOptions,
    ) -> Result<Vec<Option<R::Mesh>>, DrawError> {
        shapes
            .iter()
            .map(|shape| self.draw_occt_shape(renderer, shape, options, None))
            .collect()
    }

    /// Draws a manifold as a surface, or a cross section as closed outlines.
    ///
    /// A manifold without triangles or a cross section without polygons yields `None`.
    #[profiling::function]
    pub fn draw_manifold_or_cross_section(
        &mut self,
        renderer: &mut R,
        decomposition: &ManifoldDecomposition,
        options: &DrawManifoldOrCrossSectionOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<Option<R::Mesh>, DrawError> {
        let normalizer = MeshNormalizer::new(renderer.handedness());
        let Some(geometry) = normalizer.manifold(decomposition)? else {
            return Ok(None);
        };

        let shape = match geometry {
            ManifoldGeometry::Mesh(mesh) => {
                check_colors([
                    options.face_color.as_str(),
                    options.back_face_color.as_str(),
                ])?;
                let style = SurfaceStyle {
                    kernel: Kernel::Manifold,
                    opacity: options.face_opacity,
                    two_sided: options.draw_two_sided,
                    back_face_color: &options.back_face_color,
                    back_face_opacity: options.back_face_opacity,
                    updatable: options.updatable,
                };

                let (root, previous) = self.take_root(renderer, "manifold", existing);
                self.dispose_lines_and_points(renderer, &previous);
                let surfaces = self.draw_surfaces(
                    renderer,
                    &root,
                    slice::from_ref(&mesh),
                    slice::from_ref(&options.face_color),
                    &style,
                    previous.surfaces,
                );
                (
                    root,
                    DrawnShape {
                        surfaces,
                        ..DrawnShape::default()
                    },
                )
            }
            ManifoldGeometry::CrossSection(outlines) => {
                check_colors([options.cross_section_color.as_str()])?;
                let colors = vec![options.cross_section_color.clone(); outlines.len()];
                let style = LineStyle {
                    width: options.cross_section_width,
                    opacity: options.cross_section_opacity,
                    // outlines come out of normalization already closed
                    closed: false,
                    updatable: options.updatable,
                    tolerance: self.config.polyline_tolerance,
                };

                let (root, previous) = self.take_root(renderer, "cross section", existing);
                self.dispose_surfaces(renderer, previous.surfaces);
                self.attach_or_release_points(renderer, &root, None, previous.vertices);

                let edges = self.lines.draw(
                    renderer,
                    &mut self.unlit_materials,
                    &outlines,
                    &colors,
                    style,
                    previous.edges.as_ref(),
                );
                self.attach_or_release_lines(renderer, &root, edges.as_ref(), previous.edges);
                (
                    root,
                    DrawnShape {
                        edges,
                        ..DrawnShape::default()
                    },
                )
            }
        };

        let (root, shape) = shape;
        Ok(Some(self.finish(renderer, root, shape, options.hidden)))
    }

    /// Draws every decomposition into its own root node.
    pub fn draw_manifolds_or_cross_sections(
        &mut self,
        renderer: &mut R,
        decompositions: &[ManifoldDecomposition],
        options: &DrawManifoldOrCrossSectionOptions,
    ) -> Result<Vec<Option<R::Mesh>>, DrawError> {
        decompositions
            .iter()
            .map(|decomposition| {
                self.draw_manifold_or_cross_section(renderer, decomposition, options, None)
            })
            .collect()
    }

    /// Draws `points` as instanced spheres. An empty slice yields a root without batches.
    #[profiling::function]
    pub fn draw_points(
        &mut self,
        renderer: &mut R,
        points: &[Vec3],
        options: &DrawPointsOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<R::Mesh, DrawError> {
        let colors = resolve(
            &options.colors,
            points.len(),
            options.color_map_strategy,
            DEFAULT_FACE_COLOR,
        );
        check_colors(colors.iter().map(String::as_str))?;

        let style = PointStyle {
            opacity: options.opacity,
            size: options.size,
            updatable: options.updatable,
        };
        let root = self.points.create_or_update(
            renderer,
            &mut self.unlit_materials,
            points,
            &colors,
            style,
            existing,
        );
        renderer.set_visibility(&root, !options.hidden);
        Ok(root)
    }

    /// Draws `polylines` as thick lines, one color per polyline.
    ///
    /// Returns `None` when no polyline has at least two distinct points.
    #[profiling::function]
    pub fn draw_polylines(
        &mut self,
        renderer: &mut R,
        polylines: &[Vec<Vec3>],
        options: &DrawPolylinesOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<Option<R::Mesh>, DrawError> {
        let colors = resolve(
            &options.colors,
            polylines.len(),
            options.color_map_strategy,
            DEFAULT_FACE_COLOR,
        );
        check_colors(colors.iter().map(String::as_str))?;

        let style = LineStyle {
            width: options.size,
            opacity: options.opacity,
            closed: options.closed,
            updatable: options.updatable,
            tolerance: self.config.polyline_tolerance,
        };
        let root = self.lines.draw(
            renderer,
            &mut self.unlit_materials,
            polylines,
            &colors,
            style,
            existing,
        );

        if let Some(root) = &root {
            renderer.set_visibility(root, !options.hidden);
        }
        Ok(root)
    }

    pub async fn draw_jscad_meshes_via<D: WorkerDispatch>(
        &mut self,
        dispatch: &D,
        renderer: &mut R,
        request: D::Request,
        options: &DrawBasicGeometryOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<Option<R::Mesh>, DrawError> {
        let meshes = dispatch::fetch_jscad_meshes(dispatch, request).await?;
        self.draw_jscad_meshes(renderer, &meshes, options, existing)
    }

    pub async fn draw_occt_shape_via<D: WorkerDispatch>(
        &mut self,
        dispatch: &D,
        renderer: &mut R,
        request: D::Request,
        options: &DrawOcctShapeOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<Option<R::Mesh>, DrawError> {
        let shape = dispatch::fetch_occt_shape(dispatch, request).await?;
        self.draw_occt_shape(renderer, &shape, options, existing)
    }

    pub async fn draw_occt_shapes_via<D: WorkerDispatch>(
        &mut self,
        dispatch: &D,
        renderer: &mut R,
        request: D::Request,
        options: &DrawOcctShapeOptions,
    ) -> Result<Vec<Option<R::Mesh>>, DrawError> {
        let shapes = dispatch::fetch_occt_shapes(dispatch, request).await?;
        self.draw_occt_shapes(renderer, &shapes, options)
    }

    pub async fn draw_manifold_or_cross_section_via<D: WorkerDispatch>(
        &mut self,
        dispatch: &D,
        renderer: &mut R,
        request: D::Request,
        options: &DrawManifoldOrCrossSectionOptions,
        existing: Option<&R::Mesh>,
    ) -> Result<Option<R::Mesh>, DrawError> {
        let decomposition = dispatch::fetch_manifold_or_cross_section(dispatch, request).await?;
        self.draw_manifold_or_cross_section(renderer, &decomposition, options, existing)
    }

    pub async fn draw_manifolds_or_cross_sections_via<D: WorkerDispatch>(
        &mut self,
        dispatch: &D,
        renderer: &mut R,
        request: D::Request,
        options: &DrawManifoldOrCrossSectionOptions,
    ) -> Result<Vec<Option<R::Mesh>>, DrawError> {
        let decompositions = dispatch::fetch_manifolds_or_cross_sections(dispatch, request).await?;
        self.draw_manifolds_or_cross_sections(renderer, &decompositions, options)
    }

    /// Drops the bookkeeping of a root node the caller disposed.
    pub fn forget(&mut self, root: &R::Mesh) {
        if let Some(shape) = self.shapes.remove(root) {
            if let Some(edges) = &shape.edges {
                self.lines.forget(edges);
            }
            if let Some(vertices) = &shape.vertices {
                self.points.forget(vertices);
            }
        }
        self.points.forget(root);
        self.lines.forget(root);
    }

    /// Disposes every cached material. Scene nodes belong to the renderer and are left alone.
    pub fn dispose(&mut self, renderer: &mut R) {
        self.materials.dispose_all(renderer);
        self.unlit_materials.dispose_all(renderer);
    }

    fn take_root(
        &mut self,
        renderer: &mut R,
        name: &str,
        existing: Option<&R::Mesh>,
    ) -> (R::Mesh, DrawnShape<R::Mesh>) {
        match existing {
            Some(root) => (root.clone(), self.shapes.remove(root).unwrap_or_default()),
            None => (renderer.create_mesh_node(name), DrawnShape::default()),
        }
    }

    fn finish(
        &mut self,
        renderer: &mut R,
        root: R::Mesh,
        shape: DrawnShape<R::Mesh>,
        hidden: bool,
    ) -> R::Mesh {
        renderer.set_visibility(&root, !hidden);
        self.shapes.insert(root.clone(), shape);
        root
    }

    /// Draws one surface per mesh under `root`.
    ///
    /// With `style.updatable` and as many previous surfaces as meshes, the previous nodes
    /// receive the new vertex data. Otherwise previous nodes are disposed and replaced.
    fn draw_surfaces(
        &mut self,
        renderer: &mut R,
        root: &R::Mesh,
        meshes: &[MeshData],
        colors: &[String],
        style: &SurfaceStyle<'_>,
        previous: Vec<DrawnSurface<R::Mesh>>,
    ) -> Vec<DrawnSurface<R::Mesh>> {
        let previous = if style.updatable && previous.len() == meshes.len() {
            previous
        } else {
            self.dispose_surfaces(renderer, previous);
            Vec::new()
        };
        let mut previous = previous.into_iter();

        let two_sided = style.two_sided && self.config.two_sided;
        let mut surfaces = Vec::with_capacity(meshes.len());

        for (mesh, color) in meshes.iter().zip(colors) {
            let old = previous.next();

            let front = match &old {
                Some(old) => old.front.clone(),
                None => renderer.create_mesh_node(style.kernel.name()),
            };
            renderer.apply_vertex_data(&front, mesh, style.updatable);
            let material = self
                .materials
                .get_or_create(renderer, &MaterialSpec::lit(color, style.opacity, 0.0));
            renderer.assign_material(&front, &material);
            renderer.set_parent(&front, Some(root));

            let old_back = old.and_then(|old| old.back);
            let back_face = if two_sided {
                let request = BackFaceRequest::for_kernel(
                    style.kernel,
                    slice::from_ref(mesh),
                    style.back_face_color,
                    style.back_face_opacity,
                );
                self.back_faces
                    .generate(renderer, &mut self.materials, &request)
            } else {
                None
            };

            let back = match (back_face, old_back) {
                (Some(back_face), old_back) => {
                    let node = old_back.unwrap_or_else(|| {
                        renderer.create_mesh_node(&format!("{} back", style.kernel.name()))
                    });
                    renderer.apply_vertex_data(&node, &back_face.mesh, style.updatable);
                    renderer.assign_material(&node, &back_face.material);
                    if let Some(hint) = back_face.side_hint {
                        renderer.set_side_orientation(&node, hint);
                    }
                    renderer.set_pickable(&node, false);
                    renderer.set_parent(&node, Some(root));
                    Some(node)
                }
                (None, Some(old_back)) => {
                    dispose_node(renderer, &old_back);
                    None
                }
                (None, None) => None,
            };

            surfaces.push(DrawnSurface { front, back });
        }

        surfaces
    }

    fn dispose_surfaces(&mut self, renderer: &mut R, surfaces: Vec<DrawnSurface<R::Mesh>>) {
        for surface in surfaces {
            dispose_node(renderer, &surface.front);
            if let Some(back) = &surface.back {
                dispose_node(renderer, back);
            }
        }
    }

    fn dispose_lines_and_points(&mut self, renderer: &mut R, previous: &DrawnShape<R::Mesh>) {
        if let Some(edges) = &previous.edges {
            self.lines.dispose(renderer, edges);
        }
        if let Some(vertices) = &previous.vertices {
            self.points.dispose(renderer, vertices);
        }
    }

    fn attach_or_release_lines(
        &mut self,
        renderer: &mut R,
        root: &R::Mesh,
        current: Option<&R::Mesh>,
        previous: Option<R::Mesh>,
    ) {
        match (current, previous) {
            (Some(current), _) => renderer.set_parent(current, Some(root)),
            (None, Some(previous)) => self.lines.dispose(renderer, &previous),
            (None, None) => {}
        }
    }

    fn attach_or_release_points(
        &mut self,
        renderer: &mut R,
        root: &R::Mesh,
        current: Option<&R::Mesh>,
        previous: Option<R::Mesh>,
    ) {
        match (current, previous) {
            (Some(current), _) => renderer.set_parent(current, Some(root)),
            (None, Some(previous)) => self.points.dispose(renderer, &previous),
            (None, None) => {}
        }
    }
}
