// src/simulation/core/app_state.rs

use bevy::ecs::schedule::SystemSet;

// =========================================================================
// == Main Simulation Sets (The "Data Flow Graph") ==
// =========================================================================

/// Per-frame phases, chained in this order inside `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// The scripted runtime publishes device poses and role changes.
    PoseInput,
    /// The panel ticks: tracker, overlap pass, controls.
    Panel,
    /// Logging of the frame's state changes and the end-of-run check.
    Report,
}
