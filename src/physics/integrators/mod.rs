//! Numerical integration methods for n-body simulation
//!
//! Both families treat the coupled system `dx/dt = v`, `dv/dt = a(x)` as one
//! state vector `y = [x; v]` and advance every body together, since each
//! acceleration evaluation needs the positions of all bodies at once.

use crate::config::{ConfigError, IntegratorConfig};
use crate::physics::math::{Scalar, Vector};
use crate::physics::state::BodyState;

pub mod heun;
pub mod registry;
pub mod runge_kutta;

pub use heun::{Correction, HeunPredictorCorrector};
pub use registry::IntegratorRegistry;
pub use runge_kutta::{ButcherTableau, RungeKutta};

/// Source of accelerations for a whole ensemble
///
/// Integrators evaluate the field at intermediate positions during
/// multi-stage steps; masses are constant across a step.
pub trait AccelerationField {
    /// Overwrite `out[i]` with the acceleration of body `i`
    fn accelerations(&self, masses: &[Scalar], positions: &[Vector], out: &mut [Vector]);
}

/// Fixed-step scheme advancing a [`BodyState`] in place
pub trait Integrator: Send + Sync {
    /// Clone this integrator into a new box
    fn clone_box(&self) -> Box<dyn Integrator>;

    /// Advance positions and velocities of every body by `dt`
    ///
    /// `state.accelerations` is left holding the field evaluated at the
    /// positions the step started from.
    fn advance(&self, state: &mut BodyState, field: &dyn AccelerationField, dt: Scalar);

    /// Order of convergence of the global error
    fn convergence_order(&self) -> usize;

    /// Canonical name of the scheme
    fn name(&self) -> &'static str;
}

impl Clone for Box<dyn Integrator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Build the integrator selected by `config`
pub fn build_integrator(config: &IntegratorConfig) -> Result<Box<dyn Integrator>, ConfigError> {
    match config {
        IntegratorConfig::RungeKutta { order, b, c } => {
            let tableau = match (b, c) {
                (Some(b), Some(c)) => ButcherTableau::new(*order, b.clone(), c.clone())?,
                (None, None) => ButcherTableau::standard(*order)?,
                _ => {
                    return Err(ConfigError::InvalidTableau(
                        "stage matrix `b` and weights `c` must be given together".to_string(),
                    ));
                }
            };
            Ok(Box::new(RungeKutta::new(tableau)))
        }
        IntegratorConfig::HuenPredictorCorrector {
            max_iterations,
            tolerance,
        } => Ok(Box::new(HeunPredictorCorrector::new(
            *max_iterations,
            *tolerance,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_standard_runge_kutta() {
        for order in 1..=4 {
            let integrator = build_integrator(&IntegratorConfig::RungeKutta {
                order,
                b: None,
                c: None,
            })
            .unwrap();
            assert_eq!(integrator.convergence_order(), order);
        }
    }

    #[test]
    fn test_build_rejects_unsupported_order() {
        for order in [0, 5, 8] {
            let result = build_integrator(&IntegratorConfig::RungeKutta {
                order,
                b: None,
                c: None,
            });
            assert!(matches!(result, Err(ConfigError::UnsupportedOrder(o)) if o == order));
        }
    }

    #[test]
    fn test_build_rejects_half_tableau() {
        let result = build_integrator(&IntegratorConfig::RungeKutta {
            order: 1,
            b: None,
            c: Some(vec![1.0]),
        });
        assert!(matches!(result, Err(ConfigError::InvalidTableau(_))));
    }

    #[test]
    fn test_build_predictor_corrector() {
        let integrator = build_integrator(&IntegratorConfig::HuenPredictorCorrector {
            max_iterations: 5,
            tolerance: 1e-9,
        })
        .unwrap();
        assert_eq!(integrator.name(), "huen_predictor_corrector");
        assert_eq!(integrator.convergence_order(), 2);
    }

    #[test]
    fn test_build_predictor_corrector_rejects_bad_parameters() {
        assert!(
            build_integrator(&IntegratorConfig::HuenPredictorCorrector {
                max_iterations: 0,
                tolerance: 1e-9,
            })
            .is_err()
        );
        assert!(
            build_integrator(&IntegratorConfig::HuenPredictorCorrector {
                max_iterations: 3,
                tolerance: 0.0,
            })
            .is_err()
        );
    }

    #[test]
    fn test_boxed_integrator_clone() {
        let integrator = build_integrator(&IntegratorConfig::default()).unwrap();
        let cloned = integrator.clone();
        assert_eq!(integrator.name(), cloned.name());
    }
}
