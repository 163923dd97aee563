// src/simulation/config/mod.rs

//! Loading, validating and instantiating a scenario file.

pub mod structs;

use std::collections::HashSet;

use bevy::log::info;
use cockpit_core::controls::{LatchingCoverSwitch, PanelAssets, SwipeSwitch};
use cockpit_core::panel::Panel;
use cockpit_core::tracking::{DeviceTracker, RoleResolver};
use cockpit_core::types::{HandRole, MAX_TRACKED_DEVICES};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use thiserror::Error;

use crate::cli::Cli;
pub use structs::{ControlConfig, ScenarioConfig, ScriptCue};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load scenario: {0}")]
    Load(#[from] figment::Error),

    #[error("`{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("clip '{name}' has a non-positive length ({length})")]
    ClipLength { name: String, length: f32 },

    #[error("{kind} '{name}' is declared more than once")]
    Duplicate { kind: &'static str, name: String },

    #[error("script cue at {at}s refers to slot {slot}, but only {max} slots exist")]
    SlotOutOfRange { at: f32, slot: u32, max: usize },

    #[error("control '{control}' needs a finite, positive playback speed, got {speed}")]
    PlaybackSpeed { control: String, speed: f32 },

    #[error("pose noise standard deviation must be finite and non-negative, got {0}")]
    Noise(f64),
}

/// Reads the scenario named on the command line and applies the CLI overrides.
pub fn load_scenario(cli: &Cli) -> Result<ScenarioConfig, ConfigError> {
    info!("Loading scenario from: {}", cli.scenario.display());
    let mut config = load_from(Figment::new().merge(Toml::file(&cli.scenario)))?;

    if let Some(duration) = cli.duration {
        config.simulation.duration_seconds = duration;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    validate(&config)?;
    Ok(config)
}

fn load_from(figment: Figment) -> Result<ScenarioConfig, ConfigError> {
    Ok(figment.extract()?)
}

/// Semantic checks the deserializer cannot express.
pub fn validate(config: &ScenarioConfig) -> Result<(), ConfigError> {
    let sim = &config.simulation;
    if sim.frame_rate <= 0.0 {
        return Err(ConfigError::NotPositive {
            field: "simulation.frame_rate",
            value: f64::from(sim.frame_rate),
        });
    }
    if sim.duration_seconds <= 0.0 {
        return Err(ConfigError::NotPositive {
            field: "simulation.duration_seconds",
            value: f64::from(sim.duration_seconds),
        });
    }
    if !sim.pose_noise_stddev.is_finite() || sim.pose_noise_stddev < 0.0 {
        return Err(ConfigError::Noise(sim.pose_noise_stddev));
    }

    let mut names = HashSet::new();
    for collider in &config.colliders {
        if !names.insert(collider.name.as_str()) {
            return Err(ConfigError::Duplicate {
                kind: "collider",
                name: collider.name.clone(),
            });
        }
    }

    names.clear();
    for clip in &config.clips {
        if clip.length_seconds <= 0.0 {
            return Err(ConfigError::ClipLength {
                name: clip.name.clone(),
                length: clip.length_seconds,
            });
        }
        if !names.insert(clip.name.as_str()) {
            return Err(ConfigError::Duplicate {
                kind: "clip",
                name: clip.name.clone(),
            });
        }
    }

    names.clear();
    for control in &config.controls {
        if !names.insert(control.name()) {
            return Err(ConfigError::Duplicate {
                kind: "control",
                name: control.name().to_string(),
            });
        }
        let speed = control.playback_speed();
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::PlaybackSpeed {
                control: control.name().to_string(),
                speed,
            });
        }
    }

    for cue in &config.script {
        let slot = match *cue {
            ScriptCue::Connect { slot, .. }
            | ScriptCue::Disconnect { slot, .. }
            | ScriptCue::Move { slot, .. } => Some(slot),
            ScriptCue::AssignRole { slot, .. } => slot,
        };
        if let Some(slot) = slot.filter(|&slot| slot as usize >= MAX_TRACKED_DEVICES) {
            return Err(ConfigError::SlotOutOfRange {
                at: cue.at(),
                slot,
                max: MAX_TRACKED_DEVICES,
            });
        }
    }

    Ok(())
}

/// Builds the panel a scenario describes: tracker, collider volumes, clips and
/// controls in declaration order. Names a control refers to but the scenario
/// does not declare only disable that part of the control.
pub fn build_panel(config: &ScenarioConfig, resolver: Box<dyn RoleResolver>) -> Panel {
    let mut tracker =
        DeviceTracker::new(MAX_TRACKED_DEVICES, resolver).with_anchor(config.scene.anchor());
    for role in HandRole::ALL {
        tracker.set_hand_style(role, config.hands.style_for(role));
    }

    let mut panel = Panel::new(tracker);
    let mut assets = PanelAssets::new();
    for collider in &config.colliders {
        let handle = panel.add_collider(collider.shape, collider.pose.to_isometry());
        assets.insert_collider(collider.name.clone(), handle);
    }
    for clip in &config.clips {
        assets.insert_clip(clip.name.clone(), clip.length_seconds);
    }

    for control in &config.controls {
        let id = match control {
            ControlConfig::CoverSwitch(config) => {
                panel.add_control(Box::new(LatchingCoverSwitch::from_config(config, &assets)))
            }
            ControlConfig::SwipeSwitch(config) => {
                panel.add_control(Box::new(SwipeSwitch::from_config(config, &assets)))
            }
        };
        info!("  -> Added control '{}' as {:?}", control.name(), id);
    }

    panel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::structs::ColliderConfig;
    use approx::assert_abs_diff_eq;
    use cockpit_core::controls::ControlSnapshot;
    use cockpit_core::overlap::VolumeShape;
    use cockpit_core::types::{Rgba, SlotIndex, VolumeHandle};

    const SCENARIO: &str = r#"
        [simulation]
        seed = 7
        duration_seconds = 4.0
        frame_rate = 60.0

        [scene.anchor]
        translation = [0.0, 1.0, 0.0]
        rotation = [0.0, 0.0, 90.0]

        [[colliders]]
        name = "cover_col"
        shape = "cuboid"
        half_extents = [0.05, 0.005, 0.02]

        [[colliders]]
        name = "switch_col"
        shape = "sphere"
        radius = 0.01
        pose = { translation = [0.0, 0.1, 0.0] }

        [[clips]]
        name = "cover_anim"
        length_seconds = 0.5

        [[controls]]
        type = "CoverSwitch"
        name = "master_arm"
        cover_animation = "cover_anim"
        cover_collider = "cover_col"
        switch_animation = "switch_anim"
        switch_collider = "switch_col"

        [[controls]]
        type = "SwipeSwitch"
        name = "gear"
        animation = "cover_anim"
        up_collider = "zone_up"
        down_collider = "zone_down"
        playback_speed = 2.0

        [hands.left]
        diameter = 0.1
        color = [0.0, 0.0, 1.0, 1.0]

        [[script]]
        action = "connect"
        at = 0.0
        slot = 3

        [[script]]
        action = "assign_role"
        at = 0.0
        role = "RightHand"
        slot = 3

        [[script]]
        action = "move"
        at = 1.0
        slot = 3
        translation = [0.0, 0.0, 0.3]
    "#;

    fn parse(toml: &str) -> Result<ScenarioConfig, ConfigError> {
        let config = load_from(Figment::new().merge(Toml::string(toml)))?;
        validate(&config)?;
        Ok(config)
    }

    struct NoRoles;

    impl RoleResolver for NoRoles {
        fn resolve_role_to_slot(&self, _: HandRole) -> SlotIndex {
            SlotIndex::INVALID
        }
    }

    #[test]
    fn parses_every_section() {
        let config = parse(SCENARIO).unwrap();

        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.frame_rate, 60.0);
        assert_eq!(config.colliders.len(), 2);
        assert!(matches!(
            config.colliders[1],
            ColliderConfig {
                shape: VolumeShape::Sphere { radius },
                ..
            } if radius == 0.01
        ));
        assert_abs_diff_eq!(config.colliders[1].pose.translation.y, 0.1);
        assert!(matches!(config.controls[0], ControlConfig::CoverSwitch(_)));
        assert!(matches!(
            &config.controls[1],
            ControlConfig::SwipeSwitch(swipe) if swipe.playback_speed == 2.0
        ));
        assert_eq!(config.script.len(), 3);
        assert!(matches!(
            config.script[2],
            ScriptCue::Move { slot: 3, pose, .. } if pose.translation.z == 0.3
        ));
    }

    #[test]
    fn anchor_rotation_is_read_in_degrees() {
        let config = parse(SCENARIO).unwrap();
        let anchor = config.scene.anchor();
        let (_, _, yaw) = anchor.rotation.euler_angles();
        assert_abs_diff_eq!(yaw, std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
        assert_abs_diff_eq!(anchor.position.y, 1.0);
    }

    #[test]
    fn hand_overrides_only_touch_what_they_name() {
        let config = parse(SCENARIO).unwrap();
        let left = config.hands.style_for(HandRole::LeftHand);
        assert_abs_diff_eq!(left.radius, 0.05);
        assert_eq!(left.original_color, Rgba([0.0, 0.0, 1.0, 1.0]));
        assert_eq!(left.active_color, Rgba::YELLOW);

        let right = config.hands.style_for(HandRole::RightHand);
        assert_abs_diff_eq!(right.radius, 0.01);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.simulation.duration_seconds, 10.0);
        assert_eq!(config.simulation.frame_rate, 90.0);
        assert!(config.controls.is_empty());
    }

    #[test]
    fn unknown_control_type_is_rejected() {
        let result = parse(
            r#"
            [[controls]]
            type = "Throttle"
            name = "t"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn non_positive_clip_length_is_rejected() {
        let result = parse(
            r#"
            [[clips]]
            name = "flip"
            length_seconds = 0.0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ClipLength { .. })));
    }

    #[test]
    fn duplicate_collider_names_are_rejected() {
        let result = parse(
            r#"
            [[colliders]]
            name = "a"
            shape = "sphere"
            radius = 0.1

            [[colliders]]
            name = "a"
            shape = "sphere"
            radius = 0.2
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Duplicate { kind: "collider", .. })));
    }

    #[test]
    fn stalled_playback_speeds_are_rejected() {
        for speed in ["0.0", "-1.5", "nan"] {
            let result = parse(&format!(
                r#"
                [[controls]]
                type = "SwipeSwitch"
                name = "gear"
                animation = "gear_anim"
                up_collider = "zone_up"
                down_collider = "zone_down"
                playback_speed = {speed}
                "#
            ));
            assert!(
                matches!(&result, Err(ConfigError::PlaybackSpeed { control, .. }) if control == "gear"),
                "speed {speed} gave {result:?}"
            );
        }
    }

    #[test]
    fn script_slots_are_bounded() {
        let result = parse(
            r#"
            [[script]]
            action = "connect"
            at = 0.5
            slot = 64
            "#,
        );
        assert!(matches!(result, Err(ConfigError::SlotOutOfRange { slot: 64, .. })));
    }

    #[test]
    fn built_panel_routes_declared_colliders_and_disables_the_rest() {
        let config = parse(SCENARIO).unwrap();
        let panel = build_panel(&config, Box::new(NoRoles));

        assert_eq!(panel.control_count(), 2);
        // Colliders are numbered in declaration order, starting at 1.
        assert!(panel.route(VolumeHandle(1)).is_some());
        assert!(panel.route(VolumeHandle(2)).is_none());

        let cover = panel.control(cockpit_core::types::ControlId(0)).unwrap();
        assert_eq!(cover.config_issues().len(), 1);
        let swipe = panel.control(cockpit_core::types::ControlId(1)).unwrap();
        assert_eq!(swipe.config_issues().len(), 2);
        assert!(swipe.colliders().is_empty());

        assert!(matches!(
            panel.control_state(cockpit_core::types::ControlId(1)),
            Some(ControlSnapshot::Swipe { .. })
        ));
    }
}
