use crate::physics::clock::ClockState;
use crate::prelude::*;

/// Advance the simulation one step, entering [`AppState::Finished`] at the horizon
pub fn step_simulation(
    mut simulation: ResMut<Simulation>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let stepped = simulation.step();

    if simulation.clock_state() == ClockState::Finished {
        if stepped {
            info!(
                "Simulation finished at t = {} after {} steps (energy drift {:.3e})",
                simulation.clock().elapsed(),
                simulation.clock().steps(),
                simulation.energy_drift(),
            );
        }
        next_state.set(AppState::Finished);
    }
}

/// Log elapsed time and energy drift every `report_interval_steps` steps
pub fn report_progress(
    simulation: Res<Simulation>,
    config: Res<SimulationConfig>,
    mut last_reported: Local<Option<u64>>,
) {
    let interval = config.runtime.report_interval_steps;
    let steps = simulation.clock().steps();
    if interval == 0 || steps == 0 || steps % interval != 0 || *last_reported == Some(steps) {
        return;
    }
    *last_reported = Some(steps);

    info!(
        "t = {:.4} ({:.1}%), step {}, energy drift {:.3e}",
        simulation.clock().elapsed(),
        simulation.clock().progress() * 100.0,
        steps,
        simulation.energy_drift(),
    );
}
