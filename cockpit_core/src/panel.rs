// cockpit_core/src/panel.rs

//! The composition root: one tracker, one overlap world, and the controls in
//! declaration order, advanced together by `Panel::tick`.

use crate::controls::{ColliderPart, ControlSnapshot, ControlSurface, LogicalChange};
use crate::error::ControlError;
use crate::messages::{ControlNotice, DevicePose, OverlapEvent, TrackerEvent};
use crate::overlap::{OverlapWorld, VolumeShape};
use crate::tracking::{DeviceTracker, HandProxy};
use crate::types::{ControlId, HandRole, VolumeHandle};
use nalgebra::Isometry3;
use std::collections::HashMap;
use tracing::{debug, error};

/// Which control, and which part of it, a collider volume belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColliderRoute {
    pub control: ControlId,
    pub part: ColliderPart,
}

pub struct Panel {
    tracker: DeviceTracker,
    world: OverlapWorld,
    controls: Vec<Box<dyn ControlSurface>>,
    faulted: Vec<bool>,
    routes: HashMap<VolumeHandle, ColliderRoute>,
    next_collider: u64,
    elapsed: f64,
    notices: Vec<ControlNotice>,
    changes: Vec<LogicalChange>,
}

impl Panel {
    pub fn new(tracker: DeviceTracker) -> Self {
        Self {
            tracker,
            world: OverlapWorld::new(),
            controls: Vec::new(),
            faulted: Vec::new(),
            routes: HashMap::new(),
            next_collider: 1,
            elapsed: 0.0,
            notices: Vec::new(),
            changes: Vec::new(),
        }
    }

    // --- Setup ---

    /// Places a control collider in the overlap world.
    pub fn add_collider(&mut self, shape: VolumeShape, pose: Isometry3<f64>) -> VolumeHandle {
        let handle = VolumeHandle(self.next_collider);
        self.next_collider += 1;
        self.world.insert_target(handle, shape, pose);
        handle
    }

    /// Moves a collider, e.g. one that rides on an animated part.
    pub fn set_collider_pose(&mut self, handle: VolumeHandle, pose: Isometry3<f64>) -> bool {
        self.world.set_pose(handle, pose)
    }

    /// Appends a control. Controls are ticked in the order they were added.
    pub fn add_control(&mut self, control: Box<dyn ControlSurface>) -> ControlId {
        let id = ControlId(self.controls.len());
        for (volume, part) in control.colliders() {
            if let Some(previous) = self.routes.insert(volume, ColliderRoute { control: id, part }) {
                debug!(
                    "Collider {:?} rerouted from control {:?} to {:?}",
                    volume, previous.control, id
                );
            }
        }
        self.controls.push(control);
        self.faulted.push(false);
        id
    }

    // --- Per-frame ---

    /// The runtime reported that controller roles changed.
    pub fn on_role_changed(&mut self) {
        self.tracker.on_role_changed();
        self.sync_hand_volumes();
    }

    /// Advances the panel by one frame.
    ///
    /// Order: poses, then the overlap pass (enters before exits), then every
    /// control in declaration order. A control that answers with an error is
    /// faulted: it receives no further events or ticks, the rest of the panel
    /// carries on, and the first such error of the frame is returned.
    pub fn tick(&mut self, dt: f32, poses: &[DevicePose]) -> Result<(), ControlError> {
        self.elapsed += f64::from(dt);

        self.tracker.on_pose_batch(poses);
        self.sync_hand_volumes();

        let mut first_error = None;
        let events = self.world.step(self.elapsed);
        for event in events {
            let contact = event.contact();
            let Some(hand) = self.tracker.hand_by_volume_mut(contact.other_volume) else {
                continue;
            };
            let Some(route) = self.routes.get(&contact.this_volume) else {
                continue;
            };
            let result = match event {
                OverlapEvent::Enter(contact) => {
                    hand.begin_touch();
                    if self.faulted[route.control.0] {
                        continue;
                    }
                    self.controls[route.control.0].on_overlap_enter(route.part, contact)
                }
                OverlapEvent::Exit(contact) => {
                    hand.end_touch();
                    if self.faulted[route.control.0] {
                        continue;
                    }
                    self.controls[route.control.0].on_overlap_exit(route.part, contact)
                }
            };
            if let Err(err) = result {
                error!(
                    "Control '{}' faulted: {}",
                    self.controls[route.control.0].name(),
                    err
                );
                self.faulted[route.control.0] = true;
                first_error.get_or_insert(err);
            }
        }

        for (control, faulted) in self.controls.iter_mut().zip(&self.faulted) {
            if !faulted {
                control.tick(dt);
            }
        }

        self.collect_notices();
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // --- Queries ---

    pub fn tracker(&self) -> &DeviceTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DeviceTracker {
        &mut self.tracker
    }

    pub fn hand(&self, role: HandRole) -> Option<&HandProxy> {
        self.tracker.hand(role)
    }

    /// Whether `volume` belongs to a hand proxy. Overlaps with anything else
    /// are ignored by the controls.
    pub fn is_hand_proxy(&self, volume: VolumeHandle) -> bool {
        self.tracker.is_hand_proxy(volume)
    }

    pub fn route(&self, volume: VolumeHandle) -> Option<ColliderRoute> {
        self.routes.get(&volume).copied()
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    pub fn control(&self, id: ControlId) -> Option<&dyn ControlSurface> {
        self.controls.get(id.0).map(|control| control.as_ref())
    }

    /// Whether the control was taken out of service by an earlier error.
    pub fn is_faulted(&self, id: ControlId) -> bool {
        self.faulted.get(id.0).copied().unwrap_or(false)
    }

    pub fn control_state(&self, id: ControlId) -> Option<ControlSnapshot> {
        self.controls.get(id.0).map(|control| control.snapshot())
    }

    /// Seconds of panel time since construction.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Logical-state changes since the last drain, oldest first.
    pub fn drain_notices(&mut self) -> std::vec::Drain<'_, ControlNotice> {
        self.notices.drain(..)
    }

    // --- Internals ---

    fn sync_hand_volumes(&mut self) {
        for event in self.tracker.events() {
            match *event {
                TrackerEvent::HandProxyCreated { role, volume } => {
                    if let Some(hand) = self.tracker.hand(role) {
                        self.world.insert_probe(volume, hand.radius(), *hand.pose());
                    }
                }
                TrackerEvent::HandProxyDestroyed { volume, .. } => self.world.remove(volume),
                TrackerEvent::DeviceConnected { .. } => {}
            }
        }
        for hand in self.tracker.hands() {
            self.world.set_pose(hand.volume(), *hand.pose());
        }
    }

    fn collect_notices(&mut self) {
        for (index, control) in self.controls.iter_mut().enumerate() {
            control.drain_changes(&mut self.changes);
            for change in self.changes.drain(..) {
                self.notices.push(ControlNotice {
                    control: ControlId(index),
                    change,
                    timestamp: self.elapsed,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{
        unsupported_part, CoverFsmState, CoverState, CoverSwitchConfig, LatchingCoverSwitch,
        PanelAssets, SwipeFsmState, SwitchState,
    };
    use crate::messages::Contact;
    use crate::tracking::RoleResolver;
    use crate::types::{Rgba, SceneAnchor, SlotIndex};
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    const RIGHT_SLOT: usize = 1;

    struct FixedRoles;

    impl RoleResolver for FixedRoles {
        fn resolve_role_to_slot(&self, role: HandRole) -> SlotIndex {
            match role {
                HandRole::LeftHand => SlotIndex::INVALID,
                HandRole::RightHand => SlotIndex(RIGHT_SLOT as u32),
            }
        }
    }

    fn plate() -> VolumeShape {
        VolumeShape::Cuboid {
            half_extents: [0.05, 0.005, 0.02],
        }
    }

    fn at(x: f64, y: f64, z: f64) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
    }

    fn right_hand_at(x: f64, y: f64, z: f64) -> Vec<DevicePose> {
        let mut poses = vec![DevicePose::default(); 4];
        poses[RIGHT_SLOT] = DevicePose {
            connected: true,
            device_to_world: at(x, y, z),
        };
        poses
    }

    /// A panel with one cover/switch: cover at the origin, switch 10 cm above.
    fn cover_panel() -> (Panel, ControlId) {
        let mut panel = Panel::new(DeviceTracker::new(4, Box::new(FixedRoles)));
        let cover = panel.add_collider(plate(), Isometry3::identity());
        let switch = panel.add_collider(plate(), at(0.0, 0.1, 0.0));

        let mut assets = PanelAssets::new();
        assets.insert_collider("cover_col", cover);
        assets.insert_collider("switch_col", switch);
        assets.insert_clip("cover_anim", 0.5);
        assets.insert_clip("switch_anim", 0.2);
        let config = CoverSwitchConfig {
            name: "master_arm".into(),
            cover_animation: "cover_anim".into(),
            cover_collider: "cover_col".into(),
            switch_animation: "switch_anim".into(),
            switch_collider: "switch_col".into(),
            playback_speed: 1.0,
        };
        let id = panel.add_control(Box::new(LatchingCoverSwitch::from_config(&config, &assets)));
        panel.on_role_changed();
        (panel, id)
    }

    fn cover_of(panel: &Panel, id: ControlId) -> (CoverState, CoverFsmState) {
        match panel.control_state(id) {
            Some(ControlSnapshot::CoverSwitch { cover, fsm, .. }) => (cover, fsm),
            other => panic!("unexpected snapshot {:?}", other),
        }
    }

    #[test]
    fn collider_handles_are_routed_to_their_part() {
        let (panel, id) = cover_panel();
        assert_eq!(
            panel.route(VolumeHandle(1)),
            Some(ColliderRoute {
                control: id,
                part: ColliderPart::Cover
            })
        );
        assert_eq!(panel.route(VolumeHandle(2)).map(|r| r.part), Some(ColliderPart::Switch));
        assert!(panel.route(VolumeHandle(3)).is_none());
        assert_eq!(panel.control_count(), 1);
    }

    #[test]
    fn role_change_creates_proxy_volume() {
        let (panel, _) = cover_panel();
        let hand = panel.hand(HandRole::RightHand).expect("right hand proxy");
        assert!(panel.is_hand_proxy(hand.volume()));
        assert!(panel.hand(HandRole::LeftHand).is_none());
        assert!(!panel.is_hand_proxy(VolumeHandle(1)));
    }

    #[test]
    fn touching_the_underside_opens_the_cover() {
        let (mut panel, id) = cover_panel();

        panel.tick(0.05, &right_hand_at(0.0, 0.0, 0.025)).unwrap();
        let (cover, fsm) = cover_of(&panel, id);
        assert_eq!(cover, CoverState::Open);
        assert_eq!(fsm, CoverFsmState::IsOpening);

        let hand = panel.hand(HandRole::RightHand).unwrap();
        assert!(hand.is_highlighted());
        assert_eq!(hand.color(), Rgba::YELLOW);

        let notices: Vec<_> = panel.drain_notices().collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].control, id);
        assert_eq!(notices[0].change, LogicalChange::Cover(CoverState::Open));
        assert!((notices[0].timestamp - 0.05).abs() < 1e-6);

        for _ in 0..20 {
            panel.tick(0.05, &right_hand_at(0.0, 0.0, 0.025)).unwrap();
        }
        assert_eq!(cover_of(&panel, id).1, CoverFsmState::IsOpen);
        assert_eq!(panel.drain_notices().count(), 0);
    }

    #[test]
    fn touching_the_top_of_a_closed_cover_does_nothing() {
        let (mut panel, id) = cover_panel();
        panel.tick(0.05, &right_hand_at(0.0, 0.012, -0.01)).unwrap();

        assert!(panel.hand(HandRole::RightHand).unwrap().is_highlighted());
        assert_eq!(
            cover_of(&panel, id),
            (CoverState::Closed, CoverFsmState::IsClosed)
        );
        assert_eq!(panel.drain_notices().count(), 0);
    }

    #[test]
    fn leaving_a_collider_clears_the_highlight() {
        let (mut panel, _) = cover_panel();
        panel.tick(0.05, &right_hand_at(0.0, 0.0, 0.025)).unwrap();
        panel.tick(0.05, &right_hand_at(0.0, 0.5, 0.0)).unwrap();

        let hand = panel.hand(HandRole::RightHand).unwrap();
        assert!(!hand.is_highlighted());
        assert_eq!(hand.color(), Rgba::GREEN);
    }

    #[test]
    fn hand_proxy_follows_the_scene_anchor() {
        let (mut panel, _) = cover_panel();
        let lifted = SceneAnchor::new(Vector3::new(0.0, 1.0, 0.0), UnitQuaternion::identity());
        panel.tracker_mut().set_anchor(lifted);
        panel.tick(0.05, &right_hand_at(0.0, 0.0, 0.0)).unwrap();

        let position = panel.hand(HandRole::RightHand).unwrap().position();
        assert!((position.y - 1.0).abs() < 1e-9);
    }

    #[derive(Debug)]
    struct Miswired {
        collider: VolumeHandle,
    }

    impl ControlSurface for Miswired {
        fn name(&self) -> &str {
            "miswired"
        }
        fn colliders(&self) -> Vec<(VolumeHandle, ColliderPart)> {
            vec![(self.collider, ColliderPart::SwipeUp)]
        }
        fn on_overlap_enter(&mut self, part: ColliderPart, _: &Contact) -> Result<(), ControlError> {
            Err(unsupported_part("miswired", part))
        }
        fn on_overlap_exit(&mut self, part: ColliderPart, _: &Contact) -> Result<(), ControlError> {
            Err(unsupported_part("miswired", part))
        }
        fn tick(&mut self, _: f32) {}
        fn snapshot(&self) -> ControlSnapshot {
            ControlSnapshot::Swipe {
                switch: SwitchState::Down,
                fsm: SwipeFsmState::IsDown,
            }
        }
        fn drain_changes(&mut self, _: &mut Vec<LogicalChange>) {}
        fn config_issues(&self) -> &[ControlError] {
            &[]
        }
    }

    #[test]
    fn invalid_role_faults_only_the_miswired_control() {
        let (mut panel, cover) = cover_panel();
        let collider = panel.add_collider(plate(), at(0.0, 0.0, 0.01));
        let miswired = panel.add_control(Box::new(Miswired { collider }));

        let result = panel.tick(0.05, &right_hand_at(0.0, 0.0, 0.025));
        assert!(matches!(result, Err(ControlError::InvalidRole { .. })));
        assert!(panel.is_faulted(miswired));
        assert!(!panel.is_faulted(cover));
        assert_eq!(cover_of(&panel, cover), (CoverState::Open, CoverFsmState::IsOpening));

        for _ in 0..20 {
            panel.tick(0.05, &right_hand_at(0.0, 0.0, 0.025)).unwrap();
        }
        assert_eq!(cover_of(&panel, cover).1, CoverFsmState::IsOpen);

        panel.tick(0.05, &right_hand_at(0.0, 0.5, 0.0)).unwrap();
        assert!(!panel.hand(HandRole::RightHand).unwrap().is_highlighted());
    }
}
