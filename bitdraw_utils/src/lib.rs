pub mod color;
mod draw_args;
mod logging;

pub use color::{ColorError, Rgb};
pub use draw_args::DrawArgs;

pub use tracing;

/// Geometry kernels whose output the draw engine understands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Polygon / solid-mesh kernel
    Jscad,
    /// Boundary-representation kernel
    Occt,
    /// Manifold-mesh kernel
    Manifold,
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Jscad => "jscad",
            Kernel::Occt => "occt",
            Kernel::Manifold => "manifold",
        }
    }
}

/// Coordinate system handedness of the active scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Handedness {
    #[default]
    Left,
    Right,
}
