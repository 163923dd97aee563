// cockpit_core/src/tracking/mod.rs

//! Tracked hardware devices and the hand proxies bound to them.

mod hand;
mod subscription;

pub use hand::{HandProxy, HandStyle};
pub use subscription::{Subscription, TrackerListener};

use crate::messages::{DevicePose, TrackerEvent};
use crate::types::{HandRole, SceneAnchor, SlotIndex, VolumeHandle};
use subscription::ListenerRegistry;
use tracing::{debug, info};

/// Hand proxy volumes are numbered from here so they never collide with
/// handles a host hands out for control colliders.
pub const HAND_VOLUME_BASE: u64 = 1 << 32;

/// The tracking runtime's answer to "which device is this hand right now".
pub trait RoleResolver: Send + Sync {
    /// Returns `SlotIndex::INVALID` when no device holds the role.
    fn resolve_role_to_slot(&self, role: HandRole) -> SlotIndex;
}

/// One physical tracked device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedDeviceSlot {
    pub index: SlotIndex,
    pub connected: bool,
    /// `None` while the device is not assigned to a hand.
    pub role: Option<HandRole>,
}

#[derive(Debug)]
struct HandBinding {
    slot: SlotIndex,
    proxy: Option<HandProxy>,
}

/// Tracks device connectivity and owns the hand proxies.
///
/// Built once by the composition root and passed to whoever needs it. Hand
/// proxies are created and destroyed only while roles are re-resolved.
pub struct DeviceTracker {
    slots: Vec<TrackedDeviceSlot>,
    anchor: SceneAnchor,
    resolver: Box<dyn RoleResolver>,
    styles: [HandStyle; 2],
    hands: [HandBinding; 2],
    next_volume: u64,
    /// Events of the most recent call, reused between calls.
    events: Vec<TrackerEvent>,
    listeners: ListenerRegistry,
}

impl DeviceTracker {
    pub fn new(max_devices: usize, resolver: Box<dyn RoleResolver>) -> Self {
        let slots = (0..max_devices)
            .map(|i| TrackedDeviceSlot {
                index: SlotIndex(i as u32),
                connected: false,
                role: None,
            })
            .collect();

        Self {
            slots,
            anchor: SceneAnchor::default(),
            resolver,
            styles: HandRole::ALL.map(HandStyle::for_role),
            hands: HandRole::ALL.map(|_| HandBinding {
                slot: SlotIndex::INVALID,
                proxy: None,
            }),
            next_volume: HAND_VOLUME_BASE,
            events: Vec::with_capacity(max_devices + 4),
            listeners: ListenerRegistry::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: SceneAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn set_anchor(&mut self, anchor: SceneAnchor) {
        self.anchor = anchor;
    }

    /// Applies to proxies created after the call.
    pub fn set_hand_style(&mut self, role: HandRole, style: HandStyle) {
        self.styles[role.index()] = style;
    }

    pub fn slots(&self) -> &[TrackedDeviceSlot] {
        &self.slots
    }

    /// The slot a hand was last resolved to.
    pub fn slot_for(&self, role: HandRole) -> SlotIndex {
        self.hands[role.index()].slot
    }

    pub fn hand(&self, role: HandRole) -> Option<&HandProxy> {
        self.hands[role.index()].proxy.as_ref()
    }

    pub fn hands(&self) -> impl Iterator<Item = &HandProxy> {
        self.hands.iter().filter_map(|binding| binding.proxy.as_ref())
    }

    pub fn hand_by_volume_mut(&mut self, volume: VolumeHandle) -> Option<&mut HandProxy> {
        self.hands
            .iter_mut()
            .filter_map(|binding| binding.proxy.as_mut())
            .find(|proxy| proxy.volume() == volume)
    }

    /// Whether `volume` is one of the live hand proxies.
    pub fn is_hand_proxy(&self, volume: VolumeHandle) -> bool {
        self.hands().any(|proxy| proxy.volume() == volume)
    }

    /// Events produced by the most recent `on_pose_batch` or `on_role_changed`.
    pub fn events(&self) -> &[TrackerEvent] {
        &self.events
    }

    /// Registers a listener for every event this tracker emits.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&TrackerEvent) + Send + 'static,
    {
        self.listeners.register(Box::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Consumes one frame's pose batch (one entry per slot).
    ///
    /// Emits a `DeviceConnected` for every slot whose connectivity flipped,
    /// then moves the proxies of hands bound to connected slots. A hand losing
    /// its device triggers a role re-resolution.
    pub fn on_pose_batch(&mut self, poses: &[DevicePose]) -> &[TrackerEvent] {
        self.events.clear();

        let mut bound_device_lost = false;
        for (slot, pose) in self.slots.iter_mut().zip(poses) {
            if slot.connected != pose.connected {
                info!(
                    "Device {} is {}",
                    slot.index.0,
                    if pose.connected { "connected" } else { "disconnected" }
                );
                self.events.push(TrackerEvent::DeviceConnected {
                    slot: slot.index,
                    connected: pose.connected,
                });
                bound_device_lost |= !pose.connected && slot.role.is_some();
            }
            slot.connected = pose.connected;
        }

        if bound_device_lost {
            self.resolve_roles();
        }

        for binding in self.hands.iter_mut() {
            let Some(proxy) = binding.proxy.as_mut() else {
                continue;
            };
            let index = binding.slot.as_usize();
            let connected = self.slots.get(index).is_some_and(|slot| slot.connected);
            if let (true, Some(pose)) = (connected, poses.get(index)) {
                proxy.update_pose(&self.anchor, &pose.device_to_world);
            }
        }

        self.listeners.notify(&self.events);
        &self.events
    }

    /// Re-resolves both hands after the runtime reported a role change.
    pub fn on_role_changed(&mut self) -> &[TrackerEvent] {
        self.events.clear();
        self.resolve_roles();
        self.listeners.notify(&self.events);
        &self.events
    }

    fn resolve_roles(&mut self) {
        for role in HandRole::ALL {
            let slot = self.resolver.resolve_role_to_slot(role);
            let binding = &mut self.hands[role.index()];

            if binding.slot != slot {
                debug!("{} resolved to slot {:?}", role, slot);
                if let Some(previous) = self.slots.get_mut(binding.slot.as_usize()) {
                    if previous.role == Some(role) {
                        previous.role = None;
                    }
                }
                binding.slot = slot;
            }
            if let Some(current) = self.slots.get_mut(slot.as_usize()) {
                current.role = Some(role);
            }

            if slot.is_valid() && binding.proxy.is_none() {
                let volume = VolumeHandle(self.next_volume);
                self.next_volume += 1;
                binding.proxy = Some(HandProxy::with_style(
                    role,
                    volume,
                    self.styles[role.index()],
                ));
                info!("Created hand proxy for {} (slot {})", role, slot.0);
                self.events
                    .push(TrackerEvent::HandProxyCreated { role, volume });
            } else if !slot.is_valid() {
                if let Some(proxy) = binding.proxy.take() {
                    info!("Destroyed hand proxy for {}", role);
                    self.events.push(TrackerEvent::HandProxyDestroyed {
                        role,
                        volume: proxy.volume(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MAX_TRACKED_DEVICES;
    use nalgebra::Isometry3;
    use std::sync::{Arc, Mutex};

    /// A role table the test can rewrite between calls.
    #[derive(Clone, Default)]
    struct FakeRoles(Arc<Mutex<[SlotIndex; 2]>>);

    impl FakeRoles {
        fn new() -> Self {
            Self(Arc::new(Mutex::new([SlotIndex::INVALID; 2])))
        }

        fn assign(&self, role: HandRole, slot: SlotIndex) {
            self.0.lock().unwrap()[role.index()] = slot;
        }
    }

    impl RoleResolver for FakeRoles {
        fn resolve_role_to_slot(&self, role: HandRole) -> SlotIndex {
            self.0.lock().unwrap()[role.index()]
        }
    }

    fn batch(connected: &[usize]) -> Vec<DevicePose> {
        (0..MAX_TRACKED_DEVICES)
            .map(|i| DevicePose {
                connected: connected.contains(&i),
                device_to_world: Isometry3::translation(i as f64, 0.0, 0.0),
            })
            .collect()
    }

    #[test]
    fn connectivity_changes_are_reported_once() {
        let mut tracker = DeviceTracker::new(MAX_TRACKED_DEVICES, Box::new(FakeRoles::new()));

        let events = tracker.on_pose_batch(&batch(&[0, 3])).to_vec();
        assert_eq!(
            events,
            vec![
                TrackerEvent::DeviceConnected { slot: SlotIndex(0), connected: true },
                TrackerEvent::DeviceConnected { slot: SlotIndex(3), connected: true },
            ]
        );

        assert!(tracker.on_pose_batch(&batch(&[0, 3])).is_empty());

        let events = tracker.on_pose_batch(&batch(&[0])).to_vec();
        assert_eq!(
            events,
            vec![TrackerEvent::DeviceConnected { slot: SlotIndex(3), connected: false }]
        );
    }

    #[test]
    fn slot_zero_can_hold_a_hand() {
        let roles = FakeRoles::new();
        roles.assign(HandRole::LeftHand, SlotIndex(0));
        let mut tracker = DeviceTracker::new(MAX_TRACKED_DEVICES, Box::new(roles));

        tracker.on_role_changed();
        assert!(tracker.hand(HandRole::LeftHand).is_some());
        assert_eq!(tracker.slots()[0].role, Some(HandRole::LeftHand));
    }

    #[test]
    fn proxies_follow_role_resolution() {
        let roles = FakeRoles::new();
        let mut tracker = DeviceTracker::new(MAX_TRACKED_DEVICES, Box::new(roles.clone()));

        roles.assign(HandRole::RightHand, SlotIndex(4));
        let events = tracker.on_role_changed().to_vec();
        let volume = tracker.hand(HandRole::RightHand).unwrap().volume();
        assert_eq!(
            events,
            vec![TrackerEvent::HandProxyCreated { role: HandRole::RightHand, volume }]
        );
        assert!(tracker.is_hand_proxy(volume));

        // Re-resolving to the same slot keeps the proxy.
        assert!(tracker.on_role_changed().is_empty());

        roles.assign(HandRole::RightHand, SlotIndex::INVALID);
        let events = tracker.on_role_changed().to_vec();
        assert_eq!(
            events,
            vec![TrackerEvent::HandProxyDestroyed { role: HandRole::RightHand, volume }]
        );
        assert!(!tracker.is_hand_proxy(volume));
        assert_eq!(tracker.slots()[4].role, None);
    }

    #[test]
    fn proxies_move_only_while_their_device_is_connected() {
        let roles = FakeRoles::new();
        roles.assign(HandRole::LeftHand, SlotIndex(2));
        let mut tracker = DeviceTracker::new(MAX_TRACKED_DEVICES, Box::new(roles));
        tracker.on_role_changed();

        tracker.on_pose_batch(&batch(&[2]));
        let x = tracker.hand(HandRole::LeftHand).unwrap().position().x;
        assert_eq!(x, 2.0);

        // Slot 2 is not connected in this batch, so the pose is left alone.
        // The role still resolves to slot 2, so the proxy survives.
        let mut poses = batch(&[]);
        poses[2].device_to_world = Isometry3::translation(9.0, 0.0, 0.0);
        tracker.on_pose_batch(&poses);
        let hand = tracker.hand(HandRole::LeftHand).unwrap();
        assert_eq!(hand.position().x, 2.0);
    }

    #[test]
    fn losing_a_bound_device_destroys_its_proxy() {
        let roles = FakeRoles::new();
        roles.assign(HandRole::LeftHand, SlotIndex(1));
        let mut tracker = DeviceTracker::new(MAX_TRACKED_DEVICES, Box::new(roles.clone()));
        tracker.on_role_changed();
        tracker.on_pose_batch(&batch(&[1]));
        let volume = tracker.hand(HandRole::LeftHand).unwrap().volume();

        roles.assign(HandRole::LeftHand, SlotIndex::INVALID);
        let events = tracker.on_pose_batch(&batch(&[])).to_vec();

        assert_eq!(
            events,
            vec![
                TrackerEvent::DeviceConnected { slot: SlotIndex(1), connected: false },
                TrackerEvent::HandProxyDestroyed { role: HandRole::LeftHand, volume },
            ]
        );
        assert!(tracker.hand(HandRole::LeftHand).is_none());
    }

    #[test]
    fn listeners_are_released_with_their_subscription() {
        let mut tracker = DeviceTracker::new(MAX_TRACKED_DEVICES, Box::new(FakeRoles::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let subscription = tracker.subscribe(move |event| sink.lock().unwrap().push(*event));
        assert_eq!(tracker.listener_count(), 1);

        tracker.on_pose_batch(&batch(&[5]));
        assert_eq!(seen.lock().unwrap().len(), 1);

        drop(subscription);
        assert_eq!(tracker.listener_count(), 0);

        tracker.on_pose_batch(&batch(&[]));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
