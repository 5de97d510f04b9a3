use argh::FromArgs;
use std::sync::LazyLock;

fn tolerance(value: &str) -> Result<Option<f32>, String> {
    // accepts both `1e-7` and `0.0000001`, negative tolerances make no sense
    let parsed = value.parse::<f32>().ok().filter(|t| t.is_finite() && *t >= 0.0);
    Ok(parsed)
}

fn material_limit(value: &str) -> Result<Option<usize>, String> {
    Ok(value.parse::<usize>().ok().filter(|limit| *limit > 0))
}

/// Draw engine arguments
#[derive(Default, FromArgs)]
pub struct DrawArgs {
    #[argh(switch, hidden_help)]
    pub no_two_sided: bool,

    #[argh(option, hidden_help, from_str_fn(material_limit))]
    pub max_materials: Option<Option<usize>>,
    #[argh(option, hidden_help)]
    pub back_face_bias: Option<f32>,
    #[argh(option, hidden_help, from_str_fn(tolerance))]
    pub polyline_tolerance: Option<Option<f32>>,
    #[argh(option, hidden_help)]
    pub point_detail_threshold: Option<usize>,
}

impl DrawArgs {
    fn init() -> Option<DrawArgs> {
        let mut args = std::env::args();
        let cmd_name = args.next()?;
        let args: Vec<String> = args.collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        DrawArgs::from_args(&[&cmd_name], &args).ok()
    }

    pub fn get() -> &'static DrawArgs {
        static INSTANCE: LazyLock<DrawArgs> =
            LazyLock::new(|| DrawArgs::init().unwrap_or_default());
        &INSTANCE
    }

    pub fn max_materials(&self) -> Option<usize> {
        self.max_materials.flatten()
    }

    pub fn polyline_tolerance(&self) -> Option<f32> {
        self.polyline_tolerance.flatten()
    }
}
