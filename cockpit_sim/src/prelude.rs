// src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the cockpit_core prelude so plugins can reach the pure types
// (`Panel`, `DevicePose`, `HandRole`, ...) directly.
pub use cockpit_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::SimulationSet;
pub use crate::simulation::core::events::ControlNoticeEvent;
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::plugins::panel::PanelResource;
pub use crate::simulation::plugins::pose_source::{DeviceFeed, ScriptedRoles};
