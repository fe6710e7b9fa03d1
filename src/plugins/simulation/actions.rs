//! Action handlers for simulation commands
//!
//! This module contains handlers for SimulationCommand events including
//! restart, pause/resume and quit.

use crate::prelude::*;

pub fn handle_restart_simulation_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut simulation: ResMut<Simulation>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::Restart) {
            continue;
        }

        simulation.reset();
        next_state.set(AppState::Running);
        info!(
            "Simulation restarted with {} bodies",
            simulation.body_count()
        );
    }
}

pub fn handle_toggle_pause_simulation_event(
    mut commands_reader: EventReader<SimulationCommand>,
    current_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::TogglePause) {
            continue;
        }
        match current_state.get() {
            AppState::Running => {
                next_state.set(AppState::Paused);
                info!("Simulation paused");
            }
            AppState::Paused => {
                next_state.set(AppState::Running);
                info!("Simulation resumed");
            }
            AppState::Finished => {
                debug!("Ignoring pause toggle, simulation already finished");
            }
        }
    }
}

pub fn handle_quit_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut app_exit: EventWriter<AppExit>,
) {
    if commands_reader
        .read()
        .any(|command| matches!(command, SimulationCommand::Quit))
    {
        info!("Quit requested");
        app_exit.write(AppExit::Success);
    }
}

pub fn exit_when_finished(config: Res<SimulationConfig>, mut app_exit: EventWriter<AppExit>) {
    if config.runtime.exit_on_finish {
        app_exit.write(AppExit::Success);
    }
}
