//! Draws the output of the jscad, occt and manifold geometry kernels through a host
//! supplied [`SceneRenderer`].
//!
//! The work is split over three crates, re-exported here:
//! - [`asset`]: renderer independent mesh normalization, color mapping and polylines
//! - [`render`]: the [`DrawEngine`] with its material caches, back faces and instancing
//! - [`utils`]: colors, logging helpers and command line configuration

pub use bitdraw_asset as asset;
pub use bitdraw_render as render;
pub use bitdraw_utils as utils;

pub use bitdraw_asset::kernel::{
    JscadMesh, JscadMeshPart, KernelPayload, ManifoldDecomposition, ManifoldMesh, OcctEdge,
    OcctFace, OcctShapeMesh,
};
pub use bitdraw_asset::{
    ColorMapStrategy, ColorSpec, Handedness, Kernel, MeshData, NormalizeError, SideOrientation,
};
pub use bitdraw_render::{
    DispatchError, DispatchFuture, DisposeError, DrawBasicGeometryOptions, DrawConfig,
    DrawEngine, DrawError, DrawManifoldOrCrossSectionOptions, DrawOcctShapeOptions,
    DrawPointsOptions, DrawPolylinesOptions, KernelOperation, MaterialSpec, SceneRenderer,
    ThickLines, WorkerDispatch,
};
pub use bitdraw_utils::{DrawArgs, Rgb};

pub use ::tracing;
