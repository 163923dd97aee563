// src/simulation/plugins/panel.rs

use crate::prelude::*;
use crate::simulation::config::build_panel;

// =========================================================================
// == Panel Resource & Plugin ==
// =========================================================================

/// The cockpit panel driven by this simulation.
#[derive(Resource)]
pub struct PanelResource(pub Panel);

pub struct PanelPlugin;

impl Plugin for PanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_panel).add_systems(
            FixedUpdate,
            (
                panel_tick_system.in_set(SimulationSet::Panel),
                (
                    log_notices_system,
                    log_hand_highlight_system,
                    finish_run_system,
                )
                    .in_set(SimulationSet::Report),
            )
                .run_if(resource_exists::<PanelResource>),
        );
    }
}

// =========================================================================
// == Setup ==
// =========================================================================

fn spawn_panel(mut commands: Commands, config: Res<ScenarioConfig>, roles: Res<ScriptedRoles>) {
    let panel = build_panel(&config, Box::new(roles.clone()));

    for index in 0..panel.control_count() {
        let Some(control) = panel.control(ControlId(index)) else {
            continue;
        };
        if !control.config_issues().is_empty() {
            warn!(
                "Control '{}' is partially disabled ({} missing item(s))",
                control.name(),
                control.config_issues().len()
            );
        }
    }
    info!("Panel ready with {} control(s)", panel.control_count());
    commands.insert_resource(PanelResource(panel));
}

// =========================================================================
// == Runtime Systems ==
// =========================================================================

/// Ticks the panel with this frame's pose batch and publishes its state changes.
fn panel_tick_system(
    time: Res<Time>,
    feed: Res<DeviceFeed>,
    mut panel: ResMut<PanelResource>,
    mut notices: EventWriter<ControlNoticeEvent>,
    mut exit: EventWriter<AppExit>,
) {
    let panel = &mut panel.0;
    if feed.roles_changed {
        panel.on_role_changed();
    }

    if let Err(e) = panel.tick(time.delta_secs(), &feed.poses) {
        error!("Panel wiring error: {}", e);
        exit.write(AppExit::error());
    }

    let drained: Vec<ControlNotice> = panel.drain_notices().collect();
    for notice in drained {
        let control_name = panel
            .control(notice.control)
            .map(|control| control.name().to_string())
            .unwrap_or_default();
        notices.write(ControlNoticeEvent {
            control_name,
            notice,
        });
    }
}

fn log_notices_system(mut notices: EventReader<ControlNoticeEvent>) {
    for event in notices.read() {
        info!(
            "[{:>8.3}s] '{}' -> {:?}",
            event.notice.timestamp, event.control_name, event.notice.change
        );
    }
}

fn log_hand_highlight_system(panel: Res<PanelResource>, mut highlighted: Local<[bool; 2]>) {
    for role in HandRole::ALL {
        let now = panel
            .0
            .hand(role)
            .is_some_and(|hand| hand.is_highlighted());
        if now != highlighted[role.index()] {
            let color = panel.0.hand(role).map(|hand| hand.color());
            debug!("{} highlight {} (colour {:?})", role, now, color);
            highlighted[role.index()] = now;
        }
    }
}

/// Logs the final control states and exits once the scenario's duration is up.
fn finish_run_system(
    time: Res<Time>,
    config: Res<ScenarioConfig>,
    panel: Res<PanelResource>,
    mut exit: EventWriter<AppExit>,
    mut finished: Local<bool>,
) {
    if *finished || time.elapsed_secs() < config.simulation.duration_seconds {
        return;
    }
    *finished = true;

    for index in 0..panel.0.control_count() {
        let id = ControlId(index);
        if let (Some(control), Some(state)) = (panel.0.control(id), panel.0.control_state(id)) {
            info!("Final state of '{}': {:?}", control.name(), state);
        }
    }
    info!(
        "Scenario finished after {:.2}s of panel time",
        panel.0.elapsed()
    );
    exit.write(AppExit::Success);
}
