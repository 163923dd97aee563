// cockpit_core/src/tracking/hand.rs

use crate::types::{HandRole, Rgba, SceneAnchor, VolumeHandle};
use nalgebra::{Isometry3, Point3};

/// Size and colours of a hand proxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandStyle {
    pub radius: f64,
    pub original_color: Rgba,
    pub active_color: Rgba,
}

impl HandStyle {
    pub fn for_role(role: HandRole) -> Self {
        let (diameter, color) = match role {
            HandRole::LeftHand => (0.08, Rgba::RED),
            HandRole::RightHand => (0.02, Rgba::GREEN),
        };
        Self {
            radius: diameter / 2.0,
            original_color: color,
            active_color: Rgba::YELLOW,
        }
    }
}

/// A sphere of collision geometry that follows one tracked hand.
#[derive(Debug, Clone)]
pub struct HandProxy {
    role: HandRole,
    volume: VolumeHandle,
    radius: f64,
    pose: Isometry3<f64>,
    original_color: Rgba,
    active_color: Rgba,
    /// Number of control volumes currently overlapped.
    touching: usize,
}

impl HandProxy {
    pub fn new(role: HandRole, volume: VolumeHandle) -> Self {
        Self::with_style(role, volume, HandStyle::for_role(role))
    }

    pub fn with_style(role: HandRole, volume: VolumeHandle, style: HandStyle) -> Self {
        Self {
            role,
            volume,
            radius: style.radius,
            pose: Isometry3::identity(),
            original_color: style.original_color,
            active_color: style.active_color,
            touching: 0,
        }
    }

    pub fn role(&self) -> HandRole {
        self.role
    }

    pub fn volume(&self) -> VolumeHandle {
        self.volume
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn pose(&self) -> &Isometry3<f64> {
        &self.pose
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::from(self.pose.translation.vector)
    }

    /// Moves the proxy to the world pose of a device-space pose.
    pub fn update_pose(&mut self, anchor: &SceneAnchor, device_pose: &Isometry3<f64>) {
        self.pose = anchor.device_to_world(device_pose);
    }

    pub fn begin_touch(&mut self) {
        self.touching += 1;
    }

    pub fn end_touch(&mut self) {
        self.touching = self.touching.saturating_sub(1);
    }

    pub fn is_highlighted(&self) -> bool {
        self.touching > 0
    }

    pub fn color(&self) -> Rgba {
        if self.is_highlighted() {
            self.active_color
        } else {
            self.original_color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn highlight_holds_until_last_overlap_ends() {
        let mut hand = HandProxy::new(HandRole::RightHand, VolumeHandle(1));
        assert_eq!(hand.color(), Rgba::GREEN);

        hand.begin_touch();
        hand.begin_touch();
        hand.end_touch();
        assert_eq!(hand.color(), Rgba::YELLOW);

        hand.end_touch();
        hand.end_touch();
        assert!(!hand.is_highlighted());
        assert_eq!(hand.color(), Rgba::GREEN);
    }

    #[test]
    fn pose_goes_through_the_scene_anchor() {
        let mut hand = HandProxy::new(HandRole::LeftHand, VolumeHandle(1));
        let anchor = SceneAnchor::new(Vector3::new(0.0, 0.0, 2.0), UnitQuaternion::identity());

        hand.update_pose(&anchor, &Isometry3::translation(0.5, 0.0, 0.0));

        let position = hand.position();
        assert_abs_diff_eq!(position.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(position.z, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hand.radius(), 0.04, epsilon = 1e-12);
    }
}
