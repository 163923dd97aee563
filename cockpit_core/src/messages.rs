// cockpit_core/src/messages.rs

use crate::types::{ControlId, HandRole, SlotIndex, VolumeHandle};
use nalgebra::{Isometry3, Point3};

// =========================================================================
// == Tracking Input & Notifications ==
// =========================================================================

/// One entry of the per-frame pose batch delivered by the tracking runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePose {
    pub connected: bool,
    /// The device pose in the tracking (device) space.
    pub device_to_world: Isometry3<f64>,
}

impl Default for DevicePose {
    fn default() -> Self {
        Self {
            connected: false,
            device_to_world: Isometry3::identity(),
        }
    }
}

/// Notifications emitted by the `DeviceTracker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A slot's connectivity flag changed since the previous pose batch.
    DeviceConnected { slot: SlotIndex, connected: bool },
    /// A hand role resolved to a valid slot and received a proxy volume.
    HandProxyCreated { role: HandRole, volume: VolumeHandle },
    /// A hand role became invalid and its proxy volume was destroyed.
    HandProxyDestroyed { role: HandRole, volume: VolumeHandle },
}

// =========================================================================
// == Collision Input ==
// =========================================================================

/// A single overlap between a control volume ("this") and another volume,
/// as reported by the collision pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub this_volume: VolumeHandle,
    pub other_volume: VolumeHandle,
    /// World pose of the touched volume at the time of the pass.
    pub this_pose: Isometry3<f64>,
    /// World position of the other volume's origin.
    pub other_position: Point3<f64>,
    /// Panel time of the collision pass, in seconds.
    pub timestamp: f64,
}

impl Contact {
    /// The other volume's origin expressed in the touched volume's local frame.
    pub fn local_point(&self) -> Point3<f64> {
        self.this_pose.inverse_transform_point(&self.other_position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlapEvent {
    Enter(Contact),
    Exit(Contact),
}

impl OverlapEvent {
    pub fn contact(&self) -> &Contact {
        match self {
            OverlapEvent::Enter(contact) | OverlapEvent::Exit(contact) => contact,
        }
    }
}

// =========================================================================
// == Gesture Input ==
// =========================================================================

/// Where a contact landed relative to the touched volume's own frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachSide {
    pub local: Point3<f64>,
}

impl ApproachSide {
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            local: contact.local_point(),
        }
    }

    /// Local depth coordinate (z). Positive means the underside of a cover surface.
    pub fn depth(&self) -> f64 {
        self.local.z
    }

    /// Local height coordinate (y). Positive means the top side of the volume.
    pub fn height(&self) -> f64 {
        self.local.y
    }
}

/// A discrete input to a control gesture FSM. Consumed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    EnterFromSide(ApproachSide),
    Exit,
    AnimationSegmentFinished,
}

// =========================================================================
// == Outputs ==
// =========================================================================

/// A logical-state change of a control, stamped with the panel time it happened at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlNotice {
    pub control: ControlId,
    pub change: crate::controls::LogicalChange,
    pub timestamp: f64,
}
