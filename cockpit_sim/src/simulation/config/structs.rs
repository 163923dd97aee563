// src/simulation/config/structs.rs

use bevy::prelude::Resource;
use cockpit_core::controls::{CoverSwitchConfig, SwipeSwitchConfig};
use cockpit_core::overlap::VolumeShape;
use cockpit_core::tracking::HandStyle;
use cockpit_core::types::{HandRole, Rgba, SceneAnchor};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;

use crate::simulation::utils::serde_helpers;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a scenario TOML file.
#[derive(Resource, Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: Simulation,

    #[serde(default)]
    pub scene: SceneLayout,

    #[serde(default)]
    pub colliders: Vec<ColliderConfig>,

    #[serde(default)]
    pub clips: Vec<ClipConfig>,

    // `[[controls]]` entries, tagged by `type`.
    #[serde(default)]
    pub controls: Vec<ControlConfig>,

    #[serde(default)]
    pub hands: Hands,

    #[serde(default)]
    pub script: Vec<ScriptCue>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pose jitter generator.
    pub seed: Option<u64>,
    /// How long the run lasts, in seconds of simulated time.
    #[serde(default = "default_duration")]
    pub duration_seconds: f32,
    /// Panel ticks per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    /// Standard deviation of the positional jitter added to every device pose.
    #[serde(default)]
    pub pose_noise_stddev: f64,
}

fn default_duration() -> f32 {
    10.0
}

fn default_frame_rate() -> f32 {
    90.0
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: default_duration(),
            frame_rate: default_frame_rate(),
            pose_noise_stddev: 0.0,
        }
    }
}

/// Where the tracking space sits in the simulated world.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SceneLayout {
    #[serde(default)]
    pub anchor: Pose,
}

impl SceneLayout {
    pub fn anchor(&self) -> SceneAnchor {
        SceneAnchor::new(self.anchor.translation, self.anchor.rotation)
    }
}

/// A named collider volume on the panel model.
#[derive(Debug, Clone, Deserialize)]
pub struct ColliderConfig {
    pub name: String,
    #[serde(flatten)]
    pub shape: VolumeShape,
    #[serde(default)]
    pub pose: Pose,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipConfig {
    pub name: String,
    pub length_seconds: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ControlConfig {
    CoverSwitch(CoverSwitchConfig),
    SwipeSwitch(SwipeSwitchConfig),
}

impl ControlConfig {
    pub fn name(&self) -> &str {
        match self {
            ControlConfig::CoverSwitch(config) => &config.name,
            ControlConfig::SwipeSwitch(config) => &config.name,
        }
    }

    pub fn playback_speed(&self) -> f32 {
        match self {
            ControlConfig::CoverSwitch(config) => config.playback_speed,
            ControlConfig::SwipeSwitch(config) => config.playback_speed,
        }
    }
}

/// Optional overrides of the hand proxy appearance.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Hands {
    #[serde(default)]
    pub left: HandStyleConfig,
    #[serde(default)]
    pub right: HandStyleConfig,
}

impl Hands {
    pub fn style_for(&self, role: HandRole) -> HandStyle {
        let overrides = match role {
            HandRole::LeftHand => &self.left,
            HandRole::RightHand => &self.right,
        };
        let mut style = HandStyle::for_role(role);
        if let Some(diameter) = overrides.diameter {
            style.radius = diameter / 2.0;
        }
        if let Some(color) = overrides.color {
            style.original_color = color;
        }
        if let Some(color) = overrides.active_color {
            style.active_color = color;
        }
        style
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct HandStyleConfig {
    pub diameter: Option<f64>,
    pub color: Option<Rgba>,
    pub active_color: Option<Rgba>,
}

/// One timed entry of the scripted device feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptCue {
    /// The device in `slot` starts reporting.
    Connect { at: f32, slot: u32 },
    /// The device in `slot` stops reporting.
    Disconnect { at: f32, slot: u32 },
    /// The runtime now reports `role` on `slot` (or on no device at all).
    AssignRole {
        at: f32,
        role: HandRole,
        slot: Option<u32>,
    },
    /// A pose keyframe for the device in `slot`. Poses are interpolated
    /// between consecutive keyframes of the same slot.
    Move {
        at: f32,
        slot: u32,
        #[serde(flatten)]
        pose: Pose,
    },
}

impl ScriptCue {
    pub fn at(&self) -> f32 {
        match *self {
            ScriptCue::Connect { at, .. }
            | ScriptCue::Disconnect { at, .. }
            | ScriptCue::AssignRole { at, .. }
            | ScriptCue::Move { at, .. } => at,
        }
    }
}

// =========================================================================
// == Helper Structs for Nested Configuration ==
// =========================================================================

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct Pose {
    #[serde(with = "serde_helpers::vec3_f64_from_array", default = "Vector3::zeros")]
    pub translation: Vector3<f64>,

    #[serde(
        with = "serde_helpers::quat_f64_from_euler_deg",
        default = "UnitQuaternion::identity"
    )]
    pub rotation: UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Pose {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }
}
