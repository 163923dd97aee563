// cockpit_sim/examples/headless_panel.rs

//! Runs a cockpit panel scenario headless and logs every control change.
//!
//! To run this example:
//! `cargo run --example headless_panel -- --scenario assets/scenarios/master_arm.toml`

use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};
use clap::Parser;

use cockpit_sim::cli::Cli;
use cockpit_sim::simulation::config::load_scenario;
use cockpit_sim::CockpitSimulationPlugin;

fn main() -> AppExit {
    let cli = Cli::parse();

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: bevy::log::Level::INFO,
        filter: "info,cockpit_sim=debug,cockpit_core=debug".to_string(),
        ..default()
    });

    // --- 1. Load Simulation Configuration ---
    let config = match load_scenario(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return AppExit::error();
        }
    };
    let frame = Duration::from_secs_f32(1.0 / config.simulation.frame_rate);

    // --- 2. Core Bevy Plugins & Resources ---
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)))
        .insert_resource(cli)
        .insert_resource(config)
        // --- 3. The Cockpit Simulation ---
        .add_plugins(CockpitSimulationPlugin);

    app.run()
}
