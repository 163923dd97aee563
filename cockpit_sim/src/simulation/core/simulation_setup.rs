// src/simulation/core/simulation_setup.rs

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::prelude::*;
use crate::simulation::core::events::ControlNoticeEvent;
use crate::simulation::core::prng::SimulationRng;

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        // The scenario has to be inserted before the plugin is added.
        let Some(config) = app.world().get_resource::<ScenarioConfig>() else {
            error!("ScenarioConfig not found; insert it before adding the simulation plugins");
            return;
        };

        // --- 1. Add the Deterministic PRNG Resource ---
        let rng = match config.simulation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let frame_rate = f64::from(config.simulation.frame_rate);

        app.insert_resource(SimulationRng(rng))
            // One panel tick per fixed step.
            .insert_resource(Time::<Fixed>::from_hz(frame_rate))
            .add_event::<ControlNoticeEvent>();

        // --- CONFIGURE THE FRAME PIPELINE ---
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PoseInput,
                SimulationSet::Panel,
                SimulationSet::Report,
            )
                .chain(),
        );
    }
}
