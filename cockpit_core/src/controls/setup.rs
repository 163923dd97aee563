// cockpit_core/src/controls/setup.rs

use crate::animation::{AnimationDriver, ClipPlayer};
use crate::error::{ConfigItem, ControlError};
use crate::types::VolumeHandle;
use std::collections::HashMap;
use tracing::warn;

/// Resolves the names a control's configuration declares into live handles.
pub trait AssetResolver {
    fn resolve_clip(&self, name: &str) -> Option<Box<dyn AnimationDriver>>;

    fn resolve_collider(&self, name: &str) -> Option<VolumeHandle>;
}

/// A name table of the colliders and clips that exist on a panel's model.
#[derive(Debug, Clone, Default)]
pub struct PanelAssets {
    colliders: HashMap<String, VolumeHandle>,
    /// Clip name to clip length in seconds.
    clips: HashMap<String, f32>,
}

impl PanelAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_collider(&mut self, name: impl Into<String>, handle: VolumeHandle) {
        self.colliders.insert(name.into(), handle);
    }

    pub fn insert_clip(&mut self, name: impl Into<String>, length_secs: f32) {
        self.clips.insert(name.into(), length_secs);
    }
}

impl AssetResolver for PanelAssets {
    fn resolve_clip(&self, name: &str) -> Option<Box<dyn AnimationDriver>> {
        self.clips
            .get(name)
            .map(|&length| Box::new(ClipPlayer::new(name, length)) as Box<dyn AnimationDriver>)
    }

    fn resolve_collider(&self, name: &str) -> Option<VolumeHandle> {
        self.colliders.get(name).copied()
    }
}

// --- Helpers shared by the control constructors ---

pub(crate) fn clip_or_warn(
    resolver: &dyn AssetResolver,
    control: &str,
    name: &str,
    issues: &mut Vec<ControlError>,
) -> Option<Box<dyn AnimationDriver>> {
    let clip = resolver.resolve_clip(name);
    if clip.is_none() {
        report_missing(control, ConfigItem::AnimationClip, name, issues);
    }
    clip
}

pub(crate) fn collider_or_warn(
    resolver: &dyn AssetResolver,
    control: &str,
    name: &str,
    issues: &mut Vec<ControlError>,
) -> Option<VolumeHandle> {
    let collider = resolver.resolve_collider(name);
    if collider.is_none() {
        report_missing(control, ConfigItem::ColliderTransform, name, issues);
    }
    collider
}

fn report_missing(control: &str, item: ConfigItem, name: &str, issues: &mut Vec<ControlError>) {
    let issue = ControlError::ConfigurationMissing {
        control: control.to_string(),
        item,
        name: name.to_string(),
    };
    warn!("{}", issue);
    issues.push(issue);
}

pub(crate) fn default_playback_speed() -> f32 {
    1.0
}

/// A speed that is zero, negative or not finite would leave clips parked, so
/// it is replaced by the default.
pub(crate) fn playback_speed_or_warn(
    control: &str,
    speed: f32,
    issues: &mut Vec<ControlError>,
) -> f32 {
    if speed.is_finite() && speed > 0.0 {
        return speed;
    }
    let issue = ControlError::InvalidPlaybackSpeed {
        control: control.to_string(),
        speed,
        fallback: default_playback_speed(),
    };
    warn!("{}", issue);
    issues.push(issue);
    default_playback_speed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_declared_names_only() {
        let mut assets = PanelAssets::new();
        assets.insert_clip("cover_open", 0.4);
        assets.insert_collider("cover_collider", VolumeHandle(7));

        let clip = assets.resolve_clip("cover_open").expect("clip should resolve");
        assert_eq!(clip.clip_id(), "cover_open");
        assert_eq!(assets.resolve_collider("cover_collider"), Some(VolumeHandle(7)));
        assert!(assets.resolve_clip("missing").is_none());
        assert!(assets.resolve_collider("").is_none());
    }

    #[test]
    fn unusable_speeds_fall_back_to_default() {
        let mut issues = Vec::new();
        assert_eq!(playback_speed_or_warn("gear", 2.5, &mut issues), 2.5);
        assert!(issues.is_empty());

        for speed in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert_eq!(
                playback_speed_or_warn("gear", speed, &mut issues),
                default_playback_speed()
            );
        }
        assert_eq!(issues.len(), 4);
        assert!(matches!(issues[0], ControlError::InvalidPlaybackSpeed { .. }));
    }

    #[test]
    fn missing_items_are_recorded() {
        let assets = PanelAssets::new();
        let mut issues = Vec::new();

        assert!(collider_or_warn(&assets, "master_arm", "switch_col", &mut issues).is_none());
        assert_eq!(
            issues,
            vec![ControlError::ConfigurationMissing {
                control: "master_arm".into(),
                item: ConfigItem::ColliderTransform,
                name: "switch_col".into(),
            }]
        );
    }
}
