// cockpit_sim/src/lib.rs

use bevy::prelude::*;

// Import the plugins defined within the simulation crate.
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::panel::PanelPlugin;
use crate::simulation::plugins::pose_source::PoseSourcePlugin;

// This prelude is for convenience for other files WITHIN the cockpit_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
///
/// Expects a `ScenarioConfig` resource to be present when it is added.
pub struct CockpitSimulationPlugin;

impl Plugin for CockpitSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Deterministic RNG, fixed tick rate and the frame pipeline.
            SimulationSetupPlugin,
            // Scripted tracking runtime: poses, connectivity, role changes.
            PoseSourcePlugin,
            // The cockpit panel itself and the reporting around it.
            PanelPlugin,
        ));
    }
}
