//! Orbitrail prelude module
//!
//! Re-exports the types most plugins and systems need.

// External crate re-exports
pub use bevy::prelude::*;
pub use rand::Rng;

// Internal re-exports
pub use crate::config::SimulationConfig;
pub use crate::events::SimulationCommand;
pub use crate::physics::math::{Scalar, Vector};
pub use crate::physics::simulation::Simulation;
pub use crate::resources::SharedRng;
pub use crate::states::AppState;
pub use crate::trails::TrailBuffer;
