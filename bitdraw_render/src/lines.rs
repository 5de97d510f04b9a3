//! Thick polylines.
//!
//! Polylines sharing a color are segmentized and concatenated into a single thick line
//! mesh. The segment pair layout lets unrelated polylines live in the same buffer
//! without the renderer connecting them.

use crate::material::UnlitMaterialCache;
use crate::renderer::{SceneRenderer, ThickLines};
use bitdraw_asset::polyline::{close_polyline, segmentize};
use glamx::Vec3;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy)]
pub struct LineStyle {
    pub width: f32,
    pub opacity: f32,
    /// Connect the last point of every polyline back to its first
    pub closed: bool,
    pub updatable: bool,
    pub tolerance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineBatch<M> {
    pub mesh: M,
    pub color: String,
    pub segment_count: usize,
}

/// Segmentizes `polylines` and concatenates them per color, in order of first appearance.
pub fn segments_by_color(
    polylines: &[Vec<Vec3>],
    colors: &[String],
    style: &LineStyle,
) -> Vec<(String, Vec<Vec3>)> {
    let mut groups: Vec<(String, Vec<Vec3>)> = Vec::new();

    for (polyline, color) in polylines.iter().zip(colors) {
        let segments = if style.closed {
            segmentize(&close_polyline(polyline, style.tolerance), style.tolerance)
        } else {
            segmentize(polyline, style.tolerance)
        };
        if segments.len() < 2 {
            continue;
        }

        match groups.iter_mut().find(|(c, _)| c == color) {
            Some((_, group)) => group.extend(segments),
            None => groups.push((color.clone(), segments)),
        }
    }

    groups
}

#[derive(Debug)]
pub struct LineEngine<M> {
    lines: HashMap<M, Vec<LineBatch<M>>>,
}

impl<M> Default for LineEngine<M> {
    fn default() -> Self {
        Self {
            lines: HashMap::new(),
        }
    }
}

impl<M: Clone + Eq + Hash + Debug> LineEngine<M> {
    pub fn batches(&self, root: &M) -> &[LineBatch<M>] {
        self.lines.get(root).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn forget(&mut self, root: &M) -> bool {
        self.lines.remove(root).is_some()
    }

    /// Disposes the batches of a line drawing and its root node.
    pub fn dispose<R>(&mut self, renderer: &mut R, root: &M)
    where
        R: SceneRenderer<Mesh = M>,
    {
        self.dispose_batches(renderer, root);
        if let Err(e) = renderer.dispose_mesh(root) {
            warn!("Failed to dispose lines {root:?}: {e}");
        }
    }

    /// Draws `polylines` with one color per polyline.
    ///
    /// Returns `None` when no polyline has a segment to draw. An `existing` root whose
    /// batches have the same colors is rewritten in place when `style.updatable` is set.
    #[profiling::function]
    pub fn draw<R>(
        &mut self,
        renderer: &mut R,
        materials: &mut UnlitMaterialCache<R::Material>,
        polylines: &[Vec<Vec3>],
        colors: &[String],
        style: LineStyle,
        existing: Option<&M>,
    ) -> Option<M>
    where
        R: SceneRenderer<Mesh = M>,
    {
        let groups = segments_by_color(polylines, colors, &style);
        if groups.is_empty() {
            if let Some(root) = existing {
                self.dispose_batches(renderer, root);
            }
            return None;
        }

        let reusable = style.updatable
            && existing
                .and_then(|root| self.lines.get(root))
                .is_some_and(|batches| {
                    batches
                        .iter()
                        .map(|b| b.color.as_str())
                        .eq(groups.iter().map(|(color, _)| color.as_str()))
                });

        let root = match existing {
            Some(root) if reusable => {
                trace!("Updating {} line batches in place", groups.len());
                let batches = self.lines.get_mut(root)?;
                for (batch, (_, segments)) in batches.iter_mut().zip(&groups) {
                    let lines = ThickLines {
                        segments,
                        width: style.width,
                        updatable: true,
                    };
                    batch.mesh = renderer.create_thick_lines("lines", lines, Some(&batch.mesh));
                    batch.segment_count = segments.len() / 2;
                }
                return Some(root.clone());
            }
            Some(root) => {
                self.dispose_batches(renderer, root);
                root.clone()
            }
            None => renderer.create_mesh_node("lines"),
        };

        debug!("Building {} line batches", groups.len());
        let batches = groups
            .into_iter()
            .map(|(color, segments)| {
                let lines = ThickLines {
                    segments: &segments,
                    width: style.width,
                    updatable: style.updatable,
                };
                let mesh = renderer.create_thick_lines(&format!("lines {color}"), lines, None);

                let material = materials.get_or_create(renderer, &color, style.opacity);
                renderer.assign_material(&mesh, &material);
                renderer.set_pickable(&mesh, false);
                renderer.set_parent(&mesh, Some(&root));

                LineBatch {
                    mesh,
                    color,
                    segment_count: segments.len() / 2,
                }
            })
            .collect();

        self.lines.insert(root.clone(), batches);
        Some(root)
    }

    fn dispose_batches<R>(&mut self, renderer: &mut R, root: &M)
    where
        R: SceneRenderer<Mesh = M>,
    {
        let Some(batches) = self.lines.remove(root) else {
            return;
        };

        for batch in batches {
            if let Err(e) = renderer.dispose_mesh(&batch.mesh) {
                warn!("Failed to dispose line batch {:?}: {e}", batch.color);
            }
        }
    }
}
