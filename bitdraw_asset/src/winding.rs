//! Winding order and handedness conventions of the supported kernels.
//!
//! Every kernel has its own idea of which side of a triangle is the front. Instead of
//! branching at each call site, normalization and back-face generation both ask
//! [`winding_policy`] what to do with a given kernel's output.

use crate::mesh::MeshData;
use bitdraw_utils::{Handedness, Kernel};

/// Which side of a surface is being produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceSide {
    Front,
    Back,
}

/// Side orientation hint forwarded to the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SideOrientation {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindingPolicy {
    pub reverse_winding: bool,
    pub normal_sign: f32,
    /// `None` leaves the orientation up to the winding alone.
    pub side_hint: Option<SideOrientation>,
}

impl WindingPolicy {
    pub const IDENTITY: WindingPolicy = WindingPolicy {
        reverse_winding: false,
        normal_sign: 1.0,
        side_hint: None,
    };

    pub fn is_identity(&self) -> bool {
        !self.reverse_winding && self.normal_sign == 1.0
    }

    pub fn apply(&self, mesh: MeshData) -> MeshData {
        if self.is_identity() {
            return mesh;
        }
        mesh.reoriented(self.normal_sign, self.reverse_winding)
    }
}

/// Whether the kernel's mirrored faces should be hinted as clockwise in left-handed scenes.
pub const fn uses_clockwise_winding(kernel: Kernel) -> bool {
    match kernel {
        Kernel::Jscad | Kernel::Occt => true,
        Kernel::Manifold => false,
    }
}

/// Whether the kernel's native winding already faces the right way once normals flip.
pub const fn skips_back_face_winding_reversal(kernel: Kernel) -> bool {
    matches!(kernel, Kernel::Jscad)
}

/// Side hint for mirrored geometry.
///
/// | scene        | clockwise | hint             |
/// |--------------|-----------|------------------|
/// | right-handed | any       | counter-clockwise|
/// | left-handed  | yes       | clockwise        |
/// | left-handed  | no        | none             |
pub const fn back_face_side_hint(
    handedness: Handedness,
    use_clockwise_winding: bool,
) -> Option<SideOrientation> {
    match (handedness, use_clockwise_winding) {
        (Handedness::Right, _) => Some(SideOrientation::CounterClockwise),
        (Handedness::Left, true) => Some(SideOrientation::Clockwise),
        (Handedness::Left, false) => None,
    }
}

pub const fn winding_policy(kernel: Kernel, side: FaceSide, handedness: Handedness) -> WindingPolicy {
    match side {
        FaceSide::Front => WindingPolicy {
            // manifold winds its triangles opposite to what the renderer expects
            reverse_winding: matches!(kernel, Kernel::Manifold),
            normal_sign: 1.0,
            side_hint: None,
        },
        FaceSide::Back => WindingPolicy {
            reverse_winding: !skips_back_face_winding_reversal(kernel),
            normal_sign: -1.0,
            side_hint: back_face_side_hint(handedness, uses_clockwise_winding(kernel)),
        },
    }
}
