pub mod clock;
pub mod diagnostics;
pub mod gravity;
pub mod integrators;
pub mod math;
pub mod simulation;
pub mod state;
