use crate::back_face::BACK_FACE_Z_BIAS;
use crate::material::DEFAULT_MAX_MATERIALS;
use crate::points::{
    DEFAULT_POINT_SEGMENTS, DEFAULT_REDUCED_DETAIL_THRESHOLD, DEFAULT_REDUCED_POINT_SEGMENTS,
};
use bitdraw_asset::polyline::DEFAULT_TOLERANCE;
use bitdraw_utils::DrawArgs;
use bon::Builder;

/// Engine wide settings. Per draw settings live in the draw option structs.
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct DrawConfig {
    /// Upper bound of each material cache
    #[builder(default = DEFAULT_MAX_MATERIALS)]
    pub max_materials: usize,
    /// Disables back faces globally, whatever the draw options ask for
    #[builder(default = true)]
    pub two_sided: bool,
    #[builder(default = BACK_FACE_Z_BIAS)]
    pub back_face_z_bias: f32,
    #[builder(default = DEFAULT_TOLERANCE)]
    pub polyline_tolerance: f32,
    /// Point groups larger than this use the reduced sphere tessellation
    #[builder(default = DEFAULT_REDUCED_DETAIL_THRESHOLD)]
    pub point_detail_threshold: usize,
    #[builder(default = DEFAULT_POINT_SEGMENTS)]
    pub point_segments: u32,
    #[builder(default = DEFAULT_REDUCED_POINT_SEGMENTS)]
    pub reduced_point_segments: u32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DrawConfig {
    /// Defaults, overridden by the process arguments (`--max-materials`, `--no-two-sided`, ..).
    pub fn from_args() -> Self {
        Self::default().with_args(DrawArgs::get())
    }

    pub fn with_args(mut self, args: &DrawArgs) -> Self {
        if args.no_two_sided {
            self.two_sided = false;
        }
        if let Some(max_materials) = args.max_materials() {
            self.max_materials = max_materials;
        }
        if let Some(bias) = args.back_face_bias {
            self.back_face_z_bias = bias;
        }
        if let Some(tolerance) = args.polyline_tolerance() {
            self.polyline_tolerance = tolerance;
        }
        if let Some(threshold) = args.point_detail_threshold {
            self.point_detail_threshold = threshold;
        }
        self
    }
}
