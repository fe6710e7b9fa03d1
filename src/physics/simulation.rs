//! One episode of direct-summation gravity: ensemble, scheme and clock

use super::clock::{ClockState, SimulationClock};
use super::diagnostics;
use super::gravity::NewtonianGravity;
use super::integrators::{Integrator, build_integrator};
use super::math::{Scalar, Vector};
use super::state::{BodyRecord, BodyState, RandomBodyRanges};
use crate::config::{ConfigError, PhysicsConfig};
use crate::resources::SharedRng;
use bevy::prelude::*;

/// Where [`Simulation::reset`] takes its initial conditions from
#[derive(Debug, Clone)]
enum InitialConditions {
    Explicit(Vec<BodyRecord>),
    Random {
        count: usize,
        ranges: RandomBodyRanges,
    },
}

#[derive(Resource)]
pub struct Simulation {
    state: BodyState,
    integrator: Box<dyn Integrator>,
    gravity: NewtonianGravity,
    clock: SimulationClock,
    initial_conditions: InitialConditions,
    rng: SharedRng,
    initial_energy: Scalar,
}

impl Simulation {
    /// Validate `config`, build the integrator and draw the first episode
    pub fn from_config(config: &PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let integrator = build_integrator(&config.integrator)?;

        let initial_conditions = match &config.bodies {
            Some(bodies) => InitialConditions::Explicit(bodies.clone()),
            None => InitialConditions::Random {
                count: config.body_count,
                ranges: config.random_bodies,
            },
        };

        let mut simulation = Self {
            state: BodyState::default(),
            integrator,
            gravity: NewtonianGravity::new(config.gravitational_constant),
            clock: SimulationClock::new(config.time_step, config.max_time),
            initial_conditions,
            rng: SharedRng::from_optional_seed(config.initial_seed),
            initial_energy: 0.0,
        };
        simulation.reset();
        Ok(simulation)
    }

    /// Advance one step of `dt`
    ///
    /// Returns `false` without touching the state once the clock is finished.
    pub fn step(&mut self) -> bool {
        if !self.clock.can_step() {
            return false;
        }

        self.integrator
            .advance(&mut self.state, &self.gravity, self.clock.dt());
        self.clock.advance();
        true
    }

    /// Restore initial conditions and rewind the clock
    ///
    /// Random ensembles are redrawn from the generator, which keeps its
    /// position, so successive resets give different ensembles while the whole
    /// sequence stays reproducible from the seed.
    pub fn reset(&mut self) {
        self.state = match &self.initial_conditions {
            InitialConditions::Explicit(bodies) => BodyState::from_records(bodies),
            InitialConditions::Random { count, ranges } => {
                BodyState::random(*count, ranges, &mut self.rng)
            }
        };
        self.gravity.compute(
            &self.state.positions,
            &self.state.masses,
            &mut self.state.accelerations,
        );
        self.clock.reset();
        self.initial_energy = self.total_energy();
    }

    pub fn positions(&self) -> &[Vector] {
        &self.state.positions
    }

    pub fn velocities(&self) -> &[Vector] {
        &self.state.velocities
    }

    pub fn masses(&self) -> &[Scalar] {
        &self.state.masses
    }

    pub fn state(&self) -> &BodyState {
        &self.state
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn body_count(&self) -> usize {
        self.state.len()
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    pub fn gravitational_constant(&self) -> Scalar {
        self.gravity.g
    }

    pub fn total_energy(&self) -> Scalar {
        diagnostics::total_energy(&self.state, self.gravity.g)
    }

    /// Relative change of total energy since the last reset
    pub fn energy_drift(&self) -> Scalar {
        diagnostics::relative_drift(self.initial_energy, self.total_energy())
    }
}
