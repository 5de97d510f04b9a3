//! Per draw call options.

use bitdraw_asset::{ColorMapStrategy, ColorSpec};
use bon::Builder;

pub const DEFAULT_FACE_COLOR: &str = "#ff0000";
pub const DEFAULT_EDGE_COLOR: &str = "#ffffff";
pub const DEFAULT_VERTEX_COLOR: &str = "#ffaaff";
pub const DEFAULT_BACK_FACE_COLOR: &str = "#0000ff";
pub const DEFAULT_CROSS_SECTION_COLOR: &str = "#ff00ff";

/// Options of [`DrawEngine::draw_jscad_meshes`](crate::DrawEngine::draw_jscad_meshes).
#[derive(Debug, Clone, Builder)]
pub struct DrawBasicGeometryOptions {
    #[builder(default, into)]
    pub colors: ColorSpec,
    #[builder(default)]
    pub color_map_strategy: ColorMapStrategy,
    #[builder(default = 1.0)]
    pub opacity: f32,
    #[builder(default = true)]
    pub draw_two_sided: bool,
    #[builder(default = DEFAULT_BACK_FACE_COLOR.to_string(), into)]
    pub back_face_color: String,
    #[builder(default = 1.0)]
    pub back_face_opacity: f32,
    #[builder(default = false)]
    pub updatable: bool,
    #[builder(default = false)]
    pub hidden: bool,
}

/// Options of [`DrawEngine::draw_occt_shape`](crate::DrawEngine::draw_occt_shape).
#[derive(Debug, Clone, Builder)]
pub struct DrawOcctShapeOptions {
    #[builder(default = true)]
    pub draw_faces: bool,
    #[builder(default = true)]
    pub draw_edges: bool,
    #[builder(default = false)]
    pub draw_vertices: bool,
    #[builder(default = DEFAULT_FACE_COLOR.to_string(), into)]
    pub face_color: String,
    #[builder(default = 1.0)]
    pub face_opacity: f32,
    #[builder(default = DEFAULT_EDGE_COLOR.to_string(), into)]
    pub edge_color: String,
    #[builder(default = 1.0)]
    pub edge_opacity: f32,
    #[builder(default = 2.0)]
    pub edge_width: f32,
    #[builder(default = DEFAULT_VERTEX_COLOR.to_string(), into)]
    pub vertex_color: String,
    #[builder(default = 0.03)]
    pub vertex_size: f32,
    #[builder(default = true)]
    pub draw_two_sided: bool,
    #[builder(default = DEFAULT_BACK_FACE_COLOR.to_string(), into)]
    pub back_face_color: String,
    #[builder(default = 1.0)]
    pub back_face_opacity: f32,
    #[builder(default = false)]
    pub updatable: bool,
    #[builder(default = false)]
    pub hidden: bool,
}

/// Options of
/// [`DrawEngine::draw_manifold_or_cross_section`](crate::DrawEngine::draw_manifold_or_cross_section).
#[derive(Debug, Clone, Builder)]
pub struct DrawManifoldOrCrossSectionOptions {
    #[builder(default = DEFAULT_FACE_COLOR.to_string(), into)]
    pub face_color: String,
    #[builder(default = 1.0)]
    pub face_opacity: f32,
    #[builder(default = DEFAULT_CROSS_SECTION_COLOR.to_string(), into)]
    pub cross_section_color: String,
    #[builder(default = 2.0)]
    pub cross_section_width: f32,
    #[builder(default = 1.0)]
    pub cross_section_opacity: f32,
    #[builder(default = true)]
    pub draw_two_sided: bool,
    #[builder(default = DEFAULT_BACK_FACE_COLOR.to_string(), into)]
    pub back_face_color: String,
    #[builder(default = 1.0)]
    pub back_face_opacity: f32,
    #[builder(default = false)]
    pub updatable: bool,
    #[builder(default = false)]
    pub hidden: bool,
}

/// Options of [`DrawEngine::draw_points`](crate::DrawEngine::draw_points).
#[derive(Debug, Clone, Builder)]
pub struct DrawPointsOptions {
    #[builder(default, into)]
    pub colors: ColorSpec,
    #[builder(default)]
    pub color_map_strategy: ColorMapStrategy,
    #[builder(default = 1.0)]
    pub opacity: f32,
    /// Diameter of every point
    #[builder(default = 3.0)]
    pub size: f32,
    #[builder(default = false)]
    pub updatable: bool,
    #[builder(default = false)]
    pub hidden: bool,
}

/// Options of [`DrawEngine::draw_polylines`](crate::DrawEngine::draw_polylines).
#[derive(Debug, Clone, Builder)]
pub struct DrawPolylinesOptions {
    #[builder(default, into)]
    pub colors: ColorSpec,
    #[builder(default)]
    pub color_map_strategy: ColorMapStrategy,
    #[builder(default = 1.0)]
    pub opacity: f32,
    /// Line width
    #[builder(default = 2.0)]
    pub size: f32,
    #[builder(default = false)]
    pub closed: bool,
    #[builder(default = false)]
    pub updatable: bool,
    #[builder(default = false)]
    pub hidden: bool,
}

macro_rules! default_from_builder {
    ($($options:ty),*) => {
        $(
            impl Default for $options {
                fn default() -> Self {
                    Self::builder().build()
                }
            }
        )*
    };
}

default_from_builder!(
    DrawBasicGeometryOptions,
    DrawOcctShapeOptions,
    DrawManifoldOrCrossSectionOptions,
    DrawPointsOptions,
    DrawPolylinesOptions
);
