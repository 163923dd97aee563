// cockpit_core/src/overlap.rs

//! Simple overlap testing between hand proxies (probes) and control colliders
//! (targets). No dynamics, no contact manifolds: only "is it inside" and
//! whether that changed since the previous pass.

use crate::messages::{Contact, OverlapEvent};
use crate::types::VolumeHandle;
use nalgebra::{Isometry3, Point3, Vector3};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Shape of a control collider, in its local frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum VolumeShape {
    Sphere { radius: f64 },
    Cuboid { half_extents: [f64; 3] },
}

impl VolumeShape {
    /// Whether a sphere at world `center` touches this shape placed at `pose`.
    pub fn touches_sphere(&self, pose: &Isometry3<f64>, center: &Point3<f64>, radius: f64) -> bool {
        let local = pose.inverse_transform_point(center);
        match *self {
            VolumeShape::Sphere { radius: own } => local.coords.norm() <= own + radius,
            VolumeShape::Cuboid { half_extents } => {
                let half = Vector3::from(half_extents);
                let closest = local.coords.zip_map(&half, |c, h| c.clamp(-h, h));
                (local.coords - closest).norm_squared() <= radius * radius
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Target {
    shape: VolumeShape,
    pose: Isometry3<f64>,
}

#[derive(Debug, Clone)]
struct Probe {
    radius: f64,
    pose: Isometry3<f64>,
}

/// The set of volumes a panel tests against each other every tick.
///
/// Pairs are reported as `(target, probe)`: the target is the volume that was
/// touched. Removing a volume drops its pairs without reporting an exit.
#[derive(Debug, Clone, Default)]
pub struct OverlapWorld {
    targets: BTreeMap<VolumeHandle, Target>,
    probes: BTreeMap<VolumeHandle, Probe>,
    /// Pairs overlapping after the last pass, sorted.
    active: Vec<(VolumeHandle, VolumeHandle)>,
    scratch: Vec<(VolumeHandle, VolumeHandle)>,
    events: Vec<OverlapEvent>,
    exits: Vec<OverlapEvent>,
}

impl OverlapWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_target(&mut self, handle: VolumeHandle, shape: VolumeShape, pose: Isometry3<f64>) {
        self.targets.insert(handle, Target { shape, pose });
    }

    pub fn insert_probe(&mut self, handle: VolumeHandle, radius: f64, pose: Isometry3<f64>) {
        self.probes.insert(handle, Probe { radius, pose });
    }

    /// Returns `false` if the handle is unknown.
    pub fn set_pose(&mut self, handle: VolumeHandle, pose: Isometry3<f64>) -> bool {
        if let Some(target) = self.targets.get_mut(&handle) {
            target.pose = pose;
            true
        } else if let Some(probe) = self.probes.get_mut(&handle) {
            probe.pose = pose;
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, handle: VolumeHandle) {
        self.targets.remove(&handle);
        self.probes.remove(&handle);
        self.active
            .retain(|&(target, probe)| target != handle && probe != handle);
    }

    pub fn contains(&self, handle: VolumeHandle) -> bool {
        self.targets.contains_key(&handle) || self.probes.contains_key(&handle)
    }

    pub fn is_overlapping(&self, target: VolumeHandle, probe: VolumeHandle) -> bool {
        self.active.binary_search(&(target, probe)).is_ok()
    }

    /// Runs one pass. All enters are listed before all exits.
    pub fn step(&mut self, timestamp: f64) -> &[OverlapEvent] {
        self.events.clear();
        self.scratch.clear();

        for (&target_handle, target) in &self.targets {
            for (&probe_handle, probe) in &self.probes {
                let center = Point3::from(probe.pose.translation.vector);
                if target.shape.touches_sphere(&target.pose, &center, probe.radius) {
                    self.scratch.push((target_handle, probe_handle));
                }
            }
        }

        // Both lists are sorted, so one merge walk finds the differences.
        let (mut i, mut j) = (0, 0);
        loop {
            let change = match (self.scratch.get(i), self.active.get(j)) {
                (None, None) => break,
                (Some(now), Some(before)) if now == before => {
                    i += 1;
                    j += 1;
                    continue;
                }
                (Some(now), Some(before)) if now < before => {
                    i += 1;
                    OverlapEvent::Enter(self.contact(*now, timestamp))
                }
                (Some(now), None) => {
                    i += 1;
                    OverlapEvent::Enter(self.contact(*now, timestamp))
                }
                (_, Some(before)) => {
                    j += 1;
                    OverlapEvent::Exit(self.contact(*before, timestamp))
                }
            };
            match change {
                OverlapEvent::Enter(_) => self.events.push(change),
                OverlapEvent::Exit(_) => self.exits.push(change),
            }
        }
        self.events.append(&mut self.exits);

        std::mem::swap(&mut self.active, &mut self.scratch);
        &self.events
    }

    fn contact(&self, (target, probe): (VolumeHandle, VolumeHandle), timestamp: f64) -> Contact {
        let this_pose = self
            .targets
            .get(&target)
            .map_or_else(Isometry3::identity, |t| t.pose);
        let other_position = self
            .probes
            .get(&probe)
            .map_or_else(Point3::origin, |p| Point3::from(p.pose.translation.vector));
        Contact {
            this_volume: target,
            other_volume: probe,
            this_pose,
            other_position,
            timestamp,
        }
    }
}
