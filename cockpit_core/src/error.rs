// cockpit_core/src/error.rs

use thiserror::Error;

/// The kind of configured item a control failed to resolve at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigItem {
    AnimationClip,
    ColliderTransform,
}

impl std::fmt::Display for ConfigItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigItem::AnimationClip => write!(f, "animation clip"),
            ConfigItem::ColliderTransform => write!(f, "collider transform"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// Recoverable. Logged at setup, and only the affected sub-control is disabled.
    #[error("control '{control}' has no {item} \"{name}\"")]
    ConfigurationMissing {
        control: String,
        item: ConfigItem,
        name: String,
    },

    /// Recoverable. The configured speed magnitude cannot move a clip, so the
    /// default is used instead.
    #[error("control '{control}' has unusable playback speed {speed}, using {fallback}")]
    InvalidPlaybackSpeed {
        control: String,
        speed: f32,
        fallback: f32,
    },

    /// A wiring bug: the control was handed input outside its declared domain.
    #[error("control '{control}' cannot handle {detail}")]
    InvalidRole { control: String, detail: String },
}
