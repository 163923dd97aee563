// src/simulation/plugins/pose_source.rs

//! A scripted stand-in for the tracking runtime: device connectivity, hand
//! role assignment and keyframed device poses with optional Gaussian jitter.

use std::sync::{Arc, Mutex, PoisonError};

use nalgebra::{Isometry3, Vector3};
use rand_distr::{Distribution, Normal, NormalError};

use crate::prelude::*;

// =========================================================================
// == Resources & Plugin ==
// =========================================================================

/// The runtime's current role table, shared with the panel's tracker.
#[derive(Resource, Clone, Default)]
pub struct ScriptedRoles(Arc<Mutex<[SlotIndex; 2]>>);

impl ScriptedRoles {
    pub fn assign(&self, role: HandRole, slot: SlotIndex) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)[role.index()] = slot;
    }
}

impl RoleResolver for ScriptedRoles {
    fn resolve_role_to_slot(&self, role: HandRole) -> SlotIndex {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)[role.index()]
    }
}

/// This frame's pose batch, one entry per device slot.
#[derive(Resource, Debug)]
pub struct DeviceFeed {
    pub poses: Vec<DevicePose>,
    /// Set on frames where the runtime reported a role change.
    pub roles_changed: bool,
}

impl Default for DeviceFeed {
    fn default() -> Self {
        Self {
            poses: vec![DevicePose::default(); MAX_TRACKED_DEVICES],
            roles_changed: false,
        }
    }
}

/// The scenario's script, split into discrete cues and per-slot keyframes.
#[derive(Resource, Debug)]
pub struct PoseScript {
    /// Connectivity and role cues, ordered by time.
    cues: Vec<ScriptCue>,
    next_cue: usize,
    /// Per slot, `(time, pose)` keyframes ordered by time.
    keyframes: Vec<Vec<(f32, Isometry3<f64>)>>,
    noise: Option<Normal<f64>>,
}

impl PoseScript {
    pub fn new(script: &[ScriptCue], noise_stddev: f64) -> Result<Self, NormalError> {
        let mut cues = Vec::new();
        let mut keyframes = vec![Vec::new(); MAX_TRACKED_DEVICES];
        for cue in script {
            match *cue {
                ScriptCue::Move { at, slot, pose } => {
                    if let Some(track) = keyframes.get_mut(slot as usize) {
                        track.push((at, pose.to_isometry()));
                    }
                }
                _ => cues.push(cue.clone()),
            }
        }
        // Stable, so cues sharing a timestamp keep their file order.
        cues.sort_by(|a, b| a.at().total_cmp(&b.at()));
        for track in keyframes.iter_mut() {
            track.sort_by(|a, b| a.0.total_cmp(&b.0));
        }

        let noise = if noise_stddev > 0.0 {
            Some(Normal::new(0.0, noise_stddev)?)
        } else {
            None
        };

        Ok(Self {
            cues,
            next_cue: 0,
            keyframes,
            noise,
        })
    }

    /// The scripted pose of `slot` at time `t`, interpolated between the
    /// surrounding keyframes and held at either end.
    pub fn pose_at(&self, slot: usize, t: f32) -> Option<Isometry3<f64>> {
        let track = self.keyframes.get(slot)?;
        let (first, last) = (track.first()?, track.last()?);
        if t <= first.0 {
            return Some(first.1);
        }
        if t >= last.0 {
            return Some(last.1);
        }
        let next = track.iter().position(|(at, _)| *at > t)?;
        let (t0, a) = track[next - 1];
        let (t1, b) = track[next];
        let fraction = f64::from((t - t0) / (t1 - t0));
        Some(a.lerp_slerp(&b, fraction))
    }

    /// Applies every cue due by `now` to the feed and the role table.
    pub fn apply_cues(&mut self, now: f32, feed: &mut DeviceFeed, roles: &ScriptedRoles) {
        while let Some(cue) = self.cues.get(self.next_cue) {
            if cue.at() > now {
                break;
            }
            match *cue {
                ScriptCue::Connect { slot, .. } | ScriptCue::Disconnect { slot, .. } => {
                    let connected = matches!(cue, ScriptCue::Connect { .. });
                    if let Some(pose) = feed.poses.get_mut(slot as usize) {
                        pose.connected = connected;
                    }
                }
                ScriptCue::AssignRole { role, slot, .. } => {
                    let slot = slot.map_or(SlotIndex::INVALID, SlotIndex);
                    debug!("Runtime reports {} on slot {:?}", role, slot);
                    roles.assign(role, slot);
                    feed.roles_changed = true;
                }
                ScriptCue::Move { .. } => {}
            }
            self.next_cue += 1;
        }
    }

    fn jitter(&self, rng: &mut SimulationRng) -> Vector3<f64> {
        match &self.noise {
            Some(noise) => Vector3::from_fn(|_, _| noise.sample(&mut rng.0)),
            None => Vector3::zeros(),
        }
    }
}

pub struct PoseSourcePlugin;

impl Plugin for PoseSourcePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScriptedRoles>()
            .init_resource::<DeviceFeed>()
            .add_systems(Startup, load_pose_script)
            .add_systems(
                FixedUpdate,
                pose_source_system
                    .in_set(SimulationSet::PoseInput)
                    .run_if(resource_exists::<PoseScript>),
            );
    }
}

// =========================================================================
// == Systems ==
// =========================================================================

fn load_pose_script(
    mut commands: Commands,
    config: Res<ScenarioConfig>,
    mut exit: EventWriter<AppExit>,
) {
    match PoseScript::new(&config.script, config.simulation.pose_noise_stddev) {
        Ok(script) => {
            info!(
                "Loaded pose script: {} cues, {} keyframes",
                script.cues.len(),
                script.keyframes.iter().map(Vec::len).sum::<usize>()
            );
            commands.insert_resource(script);
        }
        Err(e) => {
            error!("Invalid pose noise: {}", e);
            exit.write(AppExit::error());
        }
    }
}

/// Publishes this frame's pose batch.
fn pose_source_system(
    time: Res<Time>,
    mut script: ResMut<PoseScript>,
    mut feed: ResMut<DeviceFeed>,
    roles: Res<ScriptedRoles>,
    mut rng: ResMut<SimulationRng>,
) {
    let now = time.elapsed_secs();
    feed.roles_changed = false;
    script.apply_cues(now, &mut feed, &roles);

    for (slot, pose) in feed.poses.iter_mut().enumerate() {
        if !pose.connected {
            continue;
        }
        if let Some(mut scripted) = script.pose_at(slot, now) {
            scripted.translation.vector += script.jitter(&mut rng);
            pose.device_to_world = scripted;
        }
    }
}
