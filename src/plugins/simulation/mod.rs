//! Simulation plugin - Self-contained plugin pattern
//!
//! Owns the [`Simulation`] resource and drives it from `FixedUpdate`. Command
//! handling, stepping, trail recording and progress reporting run as one
//! chained sequence of sets, so they never overlap within a tick.

use crate::prelude::*;

mod actions;
mod physics;

use actions::{
    exit_when_finished, handle_quit_event, handle_restart_simulation_event,
    handle_toggle_pause_simulation_event,
};
use bevy::ecs::schedule::{LogLevel, ScheduleBuildSettings};
use physics::{report_progress, step_simulation};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Commands,
    Step,
    Record,
    Report,
}

pub struct SimulationPlugin {
    config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Default for SimulationPlugin {
    /// Uses the per-user configuration, or built-in defaults when it is invalid
    fn default() -> Self {
        Self::new(validated_or_default(SimulationConfig::load_from_user_config()))
    }
}

fn validated_or_default(config: SimulationConfig) -> SimulationConfig {
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Ignoring invalid user configuration: {}. Using defaults.", e);
            SimulationConfig::default()
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();

        match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                debug!("=== Current Configuration (TOML) ===\n{}", toml_string);
                debug!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        let simulation = match Simulation::from_config(&config.physics) {
            Ok(simulation) => simulation,
            Err(e) => panic!("Invalid simulation configuration: {e}"),
        };

        info!(
            "Simulating {} bodies with {} (dt = {}, t_max = {}, G = {})",
            simulation.body_count(),
            simulation.integrator_name(),
            config.physics.time_step,
            config.physics.max_time,
            simulation.gravitational_constant(),
        );

        app.insert_resource(simulation);
        app.insert_resource(config);

        app.init_state::<AppState>();
        app.add_event::<SimulationCommand>();

        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_build_settings(ScheduleBuildSettings {
                ambiguity_detection: LogLevel::Warn,
                ..default()
            });
        });

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Commands,
                SimulationSet::Step,
                SimulationSet::Record,
                SimulationSet::Report,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                (
                    handle_restart_simulation_event,
                    handle_toggle_pause_simulation_event,
                    handle_quit_event,
                )
                    .chain()
                    .in_set(SimulationSet::Commands),
                step_simulation
                    .in_set(SimulationSet::Step)
                    .run_if(in_state(AppState::Running)),
                report_progress.in_set(SimulationSet::Report),
            ),
        );

        app.add_systems(OnEnter(AppState::Finished), exit_when_finished);
    }
}
