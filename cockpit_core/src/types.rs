// cockpit_core/src/types.rs

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;

/// Maximum number of tracked devices reported in a single pose batch.
pub const MAX_TRACKED_DEVICES: usize = 64;

// --- Core Identifiers ---

/// Index of one tracked device slot in the pose batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// The sentinel the role-resolution query returns when no device holds a role.
    pub const INVALID: SlotIndex = SlotIndex(u32::MAX);

    /// Only the sentinel is invalid. Slot 0 is a real device (usually the headset).
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for SlotIndex {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A framework-agnostic handle for a collision volume.
/// Control colliders and hand proxies are both addressed this way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VolumeHandle(pub u64);

/// Position of a control within its panel, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub usize);

/// The hand a tracked controller is currently assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum HandRole {
    LeftHand,
    RightHand,
}

impl HandRole {
    pub const ALL: [HandRole; 2] = [HandRole::LeftHand, HandRole::RightHand];

    /// Stable index used for per-hand storage.
    pub fn index(self) -> usize {
        match self {
            HandRole::LeftHand => 0,
            HandRole::RightHand => 1,
        }
    }
}

impl std::fmt::Display for HandRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandRole::LeftHand => write!(f, "LeftHand"),
            HandRole::RightHand => write!(f, "RightHand"),
        }
    }
}

/// A linear RGBA colour, used for the hand proxy's highlight state.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const RED: Rgba = Rgba([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Rgba = Rgba([0.0, 1.0, 0.0, 1.0]);
    pub const YELLOW: Rgba = Rgba([1.0, 0.92, 0.016, 1.0]);
}

/// The registration between the physical tracking space and the simulated world.
///
/// A device pose `p` maps to `rotation * p.translation + position` and its
/// orientation to `rotation * p.rotation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneAnchor {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl SceneAnchor {
    pub fn new(position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// Maps a device-space pose into the world frame.
    pub fn device_to_world(&self, device_pose: &Isometry3<f64>) -> Isometry3<f64> {
        let translation = self.rotation * device_pose.translation.vector + self.position;
        Isometry3::from_parts(
            Translation3::from(translation),
            self.rotation * device_pose.rotation,
        )
    }
}

impl Default for SceneAnchor {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn slot_zero_is_valid_and_sentinel_is_not() {
        assert!(SlotIndex(0).is_valid());
        assert!(!SlotIndex::INVALID.is_valid());
        assert_eq!(SlotIndex::default(), SlotIndex::INVALID);
    }

    #[test]
    fn anchor_rotates_then_translates_device_pose() {
        let anchor = SceneAnchor::new(
            Vector3::new(10.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let device = Isometry3::translation(1.0, 0.0, 0.0);

        let world = anchor.device_to_world(&device);

        // x-axis rotated 90 degrees about z lands on the y-axis.
        assert_abs_diff_eq!(world.translation.vector.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(world.translation.vector.y, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(world.translation.vector.z, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            world.rotation.angle_to(&anchor.rotation),
            0.0,
            epsilon = 1e-9
        );
    }
}
