//! Records a position history for every body after each simulation step
//!
//! Requires [`SimulationPlugin`](crate::plugins::simulation::SimulationPlugin)
//! to be added first, since the buffer is sized from the live simulation.

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;

pub struct TrailsPlugin;

impl Plugin for TrailsPlugin {
    fn build(&self, app: &mut App) {
        let world = app.world();
        let (Some(config), Some(simulation)) = (
            world.get_resource::<SimulationConfig>(),
            world.get_resource::<Simulation>(),
        ) else {
            error!("TrailsPlugin requires SimulationPlugin to be added first; trails are disabled");
            return;
        };

        let trails = match TrailBuffer::new(
            simulation.body_count(),
            config.trails.length,
            config.trails.max_length,
        ) {
            Ok(trails) => trails,
            Err(e) => {
                error!("Invalid trail configuration: {}; trails are disabled", e);
                return;
            }
        };
        debug!(
            "Trails keep {} of {} samples per body",
            trails.length(),
            trails.max_length()
        );

        app.insert_resource(trails);
        app.add_systems(
            FixedUpdate,
            (
                handle_trail_commands.in_set(SimulationSet::Commands),
                record_trails.in_set(SimulationSet::Record),
            ),
        );
    }
}

/// Apply trail resizes and clear history on restart
pub fn handle_trail_commands(
    mut commands_reader: EventReader<SimulationCommand>,
    mut trails: ResMut<TrailBuffer>,
) {
    for command in commands_reader.read() {
        match *command {
            SimulationCommand::Restart => trails.clear(),
            SimulationCommand::ResizeTrail(length) => match trails.resize(length) {
                Ok(()) => info!("Trail length set to {}", length),
                Err(e) => warn!("Rejected trail resize: {}", e),
            },
            _ => {}
        }
    }
}

/// Push the current positions whenever the step count changed since the last run
///
/// Paused or finished simulations leave the step count alone, so nothing is
/// recorded while they are idle. Initial positions (step 0) are never
/// recorded, however the run was started or restarted.
pub fn record_trails(
    mut commands_reader: EventReader<SimulationCommand>,
    simulation: Res<Simulation>,
    mut trails: ResMut<TrailBuffer>,
    mut last_recorded: Local<Option<u64>>,
) {
    if commands_reader
        .read()
        .any(|command| matches!(command, SimulationCommand::Restart))
    {
        *last_recorded = None;
    }

    let steps = simulation.clock().steps();
    if steps == 0 || *last_recorded == Some(steps) {
        return;
    }
    *last_recorded = Some(steps);

    if let Err(e) = trails.push(simulation.positions()) {
        warn!("Failed to record trail sample: {}", e);
    }
}
