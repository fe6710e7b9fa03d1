//! Centralized event definitions
//!
//! Commands are the only way outside code (a front end, a test, the binary)
//! drives a running simulation. Handlers live with the plugin that owns the
//! affected resource.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationCommand {
    /// Restore initial conditions, rewind the clock and clear trails
    Restart,
    TogglePause,
    /// Change the visible trail window; rejected if beyond capacity
    ResizeTrail(usize),
    Quit,
}
