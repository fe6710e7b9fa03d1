//! Test utilities for plugin testing

use bevy::prelude::*;
use bevy::state::state::StateTransition;

use crate::config::SimulationConfig;

/// Creates a minimal headless app with the Bevy plugins the simulation needs
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins((MinimalPlugins, bevy::state::app::StatesPlugin));

    app
}

/// Run `FixedUpdate` followed by state transitions, `ticks` times
///
/// Bypasses the virtual clock so each tick is exactly one fixed step.
pub fn run_fixed_steps(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
        app.world_mut().run_schedule(StateTransition);
    }
}

/// Seeded configuration for `body_count` random bodies and `steps` steps of 0.25
pub fn short_run_config(body_count: usize, steps: usize) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.physics.body_count = body_count;
    config.physics.initial_seed = Some(2024);
    config.physics.time_step = 0.25;
    config.physics.max_time = steps as f64 * 0.25;
    config.runtime.exit_on_finish = false;
    config
}
