//! Heun's predictor-corrector with bounded corrector refinement
//!
//! The outer step is fixed. Inside a step the trapezoidal corrector is applied
//! repeatedly, each pass re-evaluating the derivative at the latest estimate,
//! until successive estimates agree to a relative tolerance or the pass budget
//! is spent. Running out of passes is accepted: the last estimate becomes the
//! new state.

use super::{AccelerationField, Integrator};
use crate::config::ConfigError;
use crate::physics::math::{Scalar, Vector};
use crate::physics::state::BodyState;
use bevy::prelude::*;

/// Offset added to the corrector denominator so zero components stay finite
const RELATIVE_ERROR_OFFSET: Scalar = 1e-6;

/// Outcome of the corrector loop for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Corrector passes performed, at least one
    pub passes: usize,
    /// Relative error measured on the last pass
    pub error: Scalar,
    /// Whether `error` met the tolerance before the pass budget ran out
    pub converged: bool,
}

impl Correction {
    /// Passes beyond the first, mandatory one
    pub fn refinements(&self) -> usize {
        self.passes.saturating_sub(1)
    }
}

/// Heun predictor-corrector
///
/// ```text
/// Predictor:
///   f0     = [v; a(x)]
///   y_pred = y + dt * f0
///
/// Corrector, repeated:
///   f1     = [v_pred; a(x_pred)]
///   y_corr = y + dt * (f0 + f1) / 2
///   error  = max |y_corr - y_pred| / (y_corr + 1e-6)
///   y_pred = y_corr
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeunPredictorCorrector {
    max_iterations: usize,
    tolerance: Scalar,
}

impl HeunPredictorCorrector {
    pub fn new(max_iterations: usize, tolerance: Scalar) -> Result<Self, ConfigError> {
        if max_iterations == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be a positive number, got {tolerance}"),
            });
        }

        Ok(Self {
            max_iterations,
            tolerance,
        })
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> Scalar {
        self.tolerance
    }

    /// Advance `state` by `dt` and report how the corrector loop ended
    pub fn advance_with_report(
        &self,
        state: &mut BodyState,
        field: &dyn AccelerationField,
        dt: Scalar,
    ) -> Correction {
        let n = state.len();

        let mut initial_acceleration = vec![Vector::ZERO; n];
        field.accelerations(&state.masses, &state.positions, &mut initial_acceleration);

        let mut predicted_positions: Vec<Vector> = state
            .positions
            .iter()
            .zip(&state.velocities)
            .map(|(x, v)| *x + *v * dt)
            .collect();
        let mut predicted_velocities: Vec<Vector> = state
            .velocities
            .iter()
            .zip(&initial_acceleration)
            .map(|(v, a)| *v + *a * dt)
            .collect();

        let half_dt = 0.5 * dt;
        let mut predicted_acceleration = vec![Vector::ZERO; n];
        let mut passes = 0;
        let mut error = Scalar::INFINITY;

        while passes < self.max_iterations && error > self.tolerance {
            field.accelerations(
                &state.masses,
                &predicted_positions,
                &mut predicted_acceleration,
            );

            error = 0.0;
            for body in 0..n {
                let corrected_position = state.positions[body]
                    + (state.velocities[body] + predicted_velocities[body]) * half_dt;
                let corrected_velocity = state.velocities[body]
                    + (initial_acceleration[body] + predicted_acceleration[body]) * half_dt;

                error = nan_max(
                    nan_max(error, relative_error(corrected_position, predicted_positions[body])),
                    relative_error(corrected_velocity, predicted_velocities[body]),
                );

                predicted_positions[body] = corrected_position;
                predicted_velocities[body] = corrected_velocity;
            }

            passes += 1;
        }

        // A NaN error ends the loop like a met tolerance does
        let converged = !(error > self.tolerance);
        if !converged {
            trace!(
                "Corrector stopped after {} passes with relative error {:e} above tolerance {:e}",
                passes, error, self.tolerance
            );
        }

        state.positions = predicted_positions;
        state.velocities = predicted_velocities;
        state.accelerations = initial_acceleration;

        Correction {
            passes,
            error,
            converged,
        }
    }
}

/// Largest componentwise `|corrected - predicted| / (corrected + offset)`
///
/// The denominator is signed, so components with a negative corrected value
/// contribute a non-positive ratio. A zero numerator over a zero denominator
/// yields NaN, which propagates to the caller.
#[inline]
fn relative_error(corrected: Vector, predicted: Vector) -> Scalar {
    let ratio = (corrected - predicted).abs() / (corrected + Vector::splat(RELATIVE_ERROR_OFFSET));
    nan_max(nan_max(ratio.x, ratio.y), ratio.z)
}

/// `max` that returns NaN when either operand is NaN
#[inline]
fn nan_max(a: Scalar, b: Scalar) -> Scalar {
    if a.is_nan() || b.is_nan() {
        Scalar::NAN
    } else {
        a.max(b)
    }
}

impl Integrator for HeunPredictorCorrector {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn advance(&self, state: &mut BodyState, field: &dyn AccelerationField, dt: Scalar) {
        self.advance_with_report(state, field, dt);
    }

    fn convergence_order(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "huen_predictor_corrector"
    }
}
