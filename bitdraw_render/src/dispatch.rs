//! Asynchronous access to the geometry kernels.
//!
//! Kernels run elsewhere (a worker thread, another process, a remote service). The draw
//! engine only knows the operation names and the shape of their responses.

use bitdraw_asset::kernel::{JscadMesh, ManifoldDecomposition, OcctShapeMesh};
use bitdraw_asset::{Kernel, KernelPayload};
use futures::future::BoxFuture;
use snafu::{Snafu, ensure};
use tracing::trace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KernelOperation {
    ShapeToMesh,
    ShapesToMeshes,
    DecomposeManifoldOrCrossSection,
    DecomposeManifoldsOrCrossSections,
    JscadToMeshes,
}

impl KernelOperation {
    pub const ALL: [KernelOperation; 5] = [
        KernelOperation::ShapeToMesh,
        KernelOperation::ShapesToMeshes,
        KernelOperation::DecomposeManifoldOrCrossSection,
        KernelOperation::DecomposeManifoldsOrCrossSections,
        KernelOperation::JscadToMeshes,
    ];

    /// Operation name on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelOperation::ShapeToMesh => "shapeToMesh",
            KernelOperation::ShapesToMeshes => "shapesToMeshes",
            KernelOperation::DecomposeManifoldOrCrossSection => "decomposeManifoldOrCrossSection",
            KernelOperation::DecomposeManifoldsOrCrossSections => {
                "decomposeManifoldsOrCrossSections"
            }
            KernelOperation::JscadToMeshes => "jscadToMeshes",
        }
    }

    pub fn kernel(&self) -> Kernel {
        match self {
            KernelOperation::ShapeToMesh | KernelOperation::ShapesToMeshes => Kernel::Occt,
            KernelOperation::DecomposeManifoldOrCrossSection
            | KernelOperation::DecomposeManifoldsOrCrossSections => Kernel::Manifold,
            KernelOperation::JscadToMeshes => Kernel::Jscad,
        }
    }

    /// Whether the response holds one entry per requested entity.
    pub fn is_batched(&self) -> bool {
        matches!(
            self,
            KernelOperation::ShapesToMeshes
                | KernelOperation::DecomposeManifoldsOrCrossSections
                | KernelOperation::JscadToMeshes
        )
    }

    fn accepts(&self, payload: &KernelPayload) -> bool {
        matches!(
            (self, payload),
            (KernelOperation::ShapeToMesh, KernelPayload::Occt(_))
                | (KernelOperation::ShapesToMeshes, KernelPayload::Occts(_))
                | (
                    KernelOperation::DecomposeManifoldOrCrossSection,
                    KernelPayload::Manifold(_)
                )
                | (
                    KernelOperation::DecomposeManifoldsOrCrossSections,
                    KernelPayload::Manifolds(_)
                )
                | (KernelOperation::JscadToMeshes, KernelPayload::Jscad(_))
        )
    }
}

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[snafu(display("Kernel operation {} failed: {message}", operation.as_str()))]
    Worker {
        operation: KernelOperation,
        message: String,
    },
    #[snafu(display(
        "Kernel operation {} answered with a {} payload",
        operation.as_str(),
        kernel.name()
    ))]
    UnexpectedPayload {
        operation: KernelOperation,
        kernel: Kernel,
    },
}

pub type DispatchFuture<'a> = BoxFuture<'a, Result<KernelPayload, DispatchError>>;

/// Runs kernel operations off the caller's thread.
///
/// The returned futures are not cancellable. A caller that loses interest simply drops
/// the future and the result is discarded once it resolves.
pub trait WorkerDispatch {
    /// Kernel specific request, opaque to the draw engine
    type Request: Send;

    fn call(&self, operation: KernelOperation, request: Self::Request) -> DispatchFuture<'_>;
}

/// Calls `operation` and checks that the response has the shape the operation promises.
pub async fn fetch_payload<D: WorkerDispatch>(
    dispatch: &D,
    operation: KernelOperation,
    request: D::Request,
) -> Result<KernelPayload, DispatchError> {
    trace!("Dispatching {}", operation.as_str());
    let payload = dispatch.call(operation, request).await?;

    ensure!(
        operation.accepts(&payload),
        UnexpectedPayloadSnafu {
            operation,
            kernel: payload.kernel(),
        }
    );

    Ok(payload)
}

macro_rules! typed_fetch {
    ($(#[$doc:meta])* $name:ident, $operation:ident, $variant:ident, $output:ty) => {
        $(#[$doc])*
        pub async fn $name<D: WorkerDispatch>(
            dispatch: &D,
            request: D::Request,
        ) -> Result<$output, DispatchError> {
            match fetch_payload(dispatch, KernelOperation::$operation, request).await? {
                KernelPayload::$variant(output) => Ok(output),
                other => UnexpectedPayloadSnafu {
                    operation: KernelOperation::$operation,
                    kernel: other.kernel(),
                }
                .fail(),
            }
        }
    };
}

typed_fetch!(
    /// Tessellates one boundary representation shape.
    fetch_occt_shape,
    ShapeToMesh,
    Occt,
    OcctShapeMesh
);
typed_fetch!(fetch_occt_shapes, ShapesToMeshes, Occts, Vec<OcctShapeMesh>);
typed_fetch!(
    /// Decomposes one manifold, or the polygons of a cross section.
    fetch_manifold_or_cross_section,
    DecomposeManifoldOrCrossSection,
    Manifold,
    ManifoldDecomposition
);
typed_fetch!(
    fetch_manifolds_or_cross_sections,
    DecomposeManifoldsOrCrossSections,
    Manifolds,
    Vec<ManifoldDecomposition>
);
typed_fetch!(fetch_jscad_meshes, JscadToMeshes, Jscad, Vec<JscadMesh>);
