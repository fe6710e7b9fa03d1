//! Orbitrail library
//!
//! Direct-summation gravity for small ensembles, integrated with explicit
//! Runge-Kutta or Heun predictor-corrector schemes, plus a ring buffer of
//! recent positions per body. The binary wraps this in a headless Bevy app;
//! the library is usable on its own and from integration tests.

pub mod cli;
pub mod config;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod resources;
pub mod states;
pub mod trails;

// Test utilities are public for integration tests
pub mod test_utils;
