//! Draws normalized kernel geometry through a [`SceneRenderer`].
//!
//! The [`DrawEngine`] owns the material caches and the instancing bookkeeping. The host
//! application owns the renderer and the scene nodes, and passes the renderer into every
//! draw call.

pub mod back_face;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod lines;
pub mod material;
pub mod options;
pub mod points;
pub mod renderer;

pub use back_face::{BACK_FACE_Z_BIAS, BackFace, BackFaceGenerator, BackFaceRequest};
pub use config::DrawConfig;
pub use dispatch::{DispatchError, DispatchFuture, KernelOperation, WorkerDispatch};
pub use engine::{DrawEngine, DrawError};
pub use lines::{LineEngine, LineStyle};
pub use material::{CachedMaterial, MaterialCache, MaterialKey, MaterialSpec, UnlitMaterialCache};
pub use options::*;
pub use points::{InstanceBatch, PointInstanceGroup, PointInstancingEngine, PointStyle};
pub use renderer::{DisposeError, SceneRenderer, ThickLines};
