//! Renderer independent geometry for bitdraw.
//!
//! Everything in this crate is plain data: the canonical [`MeshData`], the payload types
//! of the supported geometry kernels and the pure functions that turn them into drawable
//! meshes, colors and line segments. Nothing here talks to a renderer.

pub mod color_map;
pub mod kernel;
pub mod mesh;
pub mod polyline;
pub mod winding;

pub use color_map::{ColorMapStrategy, ColorSpec};
pub use kernel::{KernelPayload, MeshNormalizer, NormalizeError, NormalizedGeometry};
pub use mesh::{MeshData, MeshError};
pub use winding::{FaceSide, SideOrientation, WindingPolicy, winding_policy};

pub use bitdraw_utils::{Handedness, Kernel};
