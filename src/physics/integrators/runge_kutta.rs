//! Explicit Runge-Kutta methods driven by a Butcher tableau

use super::{AccelerationField, Integrator};
use crate::config::ConfigError;
use crate::physics::math::{Scalar, Vector};
use crate::physics::state::BodyState;
use bevy::prelude::*;

/// Stage matrix `b` and weights `c` of an explicit Runge-Kutta scheme
///
/// `b` is strictly lower triangular: row `i` weights the derivatives of the
/// earlier stages `m < i` when forming the state evaluated at stage `i`.
/// Rows may be shorter than the order; missing entries are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherTableau {
    order: usize,
    b: Vec<Vec<Scalar>>,
    c: Vec<Scalar>,
}

impl ButcherTableau {
    pub const MAX_ORDER: usize = 4;

    /// Validate and build a tableau from configuration values
    ///
    /// `b` may list all `order` rows (row 0 empty or zero) or only the
    /// `order - 1` rows of stages 1 and up.
    pub fn new(order: usize, b: Vec<Vec<Scalar>>, c: Vec<Scalar>) -> Result<Self, ConfigError> {
        if !(1..=Self::MAX_ORDER).contains(&order) {
            return Err(ConfigError::UnsupportedOrder(order));
        }

        if c.len() != order {
            return Err(ConfigError::InvalidTableau(format!(
                "order {order} needs {order} weights in `c`, got {}",
                c.len()
            )));
        }

        let b = if b.len() == order {
            b
        } else if b.len() + 1 == order {
            std::iter::once(Vec::new()).chain(b).collect()
        } else {
            return Err(ConfigError::InvalidTableau(format!(
                "order {order} needs {order} or {} rows in `b`, got {}",
                order - 1,
                b.len()
            )));
        };

        for (i, row) in b.iter().enumerate() {
            if row.len() > order {
                return Err(ConfigError::InvalidTableau(format!(
                    "row {i} of `b` has {} entries, more than the order {order}",
                    row.len()
                )));
            }
            for (m, weight) in row.iter().enumerate() {
                if !weight.is_finite() {
                    return Err(ConfigError::InvalidTableau(format!(
                        "b[{i}][{m}] is not finite"
                    )));
                }
                if m >= i && *weight != 0.0 {
                    return Err(ConfigError::InvalidTableau(format!(
                        "b[{i}][{m}] = {weight} is on or above the diagonal of an explicit scheme"
                    )));
                }
            }
        }

        if c.iter().any(|weight| !weight.is_finite()) {
            return Err(ConfigError::InvalidTableau(
                "weights in `c` must be finite".to_string(),
            ));
        }

        let weight_sum: Scalar = c.iter().sum();
        if (weight_sum - 1.0).abs() > 1e-9 {
            warn!(
                "Runge-Kutta weights sum to {} instead of 1; the scheme is inconsistent",
                weight_sum
            );
        }

        Ok(Self { order, b, c })
    }

    /// The textbook tableau for `order`
    ///
    /// 1: explicit Euler, 2: midpoint, 3: Kutta's third-order, 4: classic RK4.
    pub fn standard(order: usize) -> Result<Self, ConfigError> {
        let (b, c): (Vec<Vec<Scalar>>, Vec<Scalar>) = match order {
            1 => (vec![vec![]], vec![1.0]),
            2 => (vec![vec![], vec![0.5]], vec![0.0, 1.0]),
            3 => (
                vec![vec![], vec![0.5], vec![-1.0, 2.0]],
                vec![1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0],
            ),
            4 => (
                vec![vec![], vec![0.5], vec![0.0, 0.5], vec![0.0, 0.0, 1.0]],
                vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            ),
            _ => return Err(ConfigError::UnsupportedOrder(order)),
        };
        Self::new(order, b, c)
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Weight of stage `m` in the state of stage `i`
    #[inline]
    pub fn stage_weight(&self, i: usize, m: usize) -> Scalar {
        self.b[i].get(m).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &[Scalar] {
        &self.c
    }
}

/// Explicit Runge-Kutta integrator of order 1 through 4
///
/// Each stage `i` evaluates the state
/// `x_i = x + dt * sum_m b[i][m] * v_m`, `v_i = v + dt * sum_m b[i][m] * a_m`
/// and records `v_i` and `a(x_i)` as its derivative. The step combines the
/// stage derivatives with the weights `c`.
#[derive(Debug, Clone)]
pub struct RungeKutta {
    tableau: ButcherTableau,
}

impl RungeKutta {
    pub fn new(tableau: ButcherTableau) -> Self {
        Self { tableau }
    }
}

impl Integrator for RungeKutta {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(self.clone())
    }

    fn advance(&self, state: &mut BodyState, field: &dyn AccelerationField, dt: Scalar) {
        let n = state.len();
        let stages = self.tableau.order();

        let mut velocity_stages: Vec<Vec<Vector>> = Vec::with_capacity(stages);
        let mut acceleration_stages: Vec<Vec<Vector>> = Vec::with_capacity(stages);

        // Stage 0 is the derivative at the current state
        let mut initial_acceleration = vec![Vector::ZERO; n];
        field.accelerations(&state.masses, &state.positions, &mut initial_acceleration);
        velocity_stages.push(state.velocities.clone());
        acceleration_stages.push(initial_acceleration);

        let mut displaced_positions = vec![Vector::ZERO; n];
        for i in 1..stages {
            displaced_positions.copy_from_slice(&state.positions);
            let mut stage_velocity = state.velocities.clone();

            for m in 0..i {
                let weight = self.tableau.stage_weight(i, m);
                if weight == 0.0 {
                    continue;
                }
                let scale = dt * weight;
                for body in 0..n {
                    displaced_positions[body] += velocity_stages[m][body] * scale;
                    stage_velocity[body] += acceleration_stages[m][body] * scale;
                }
            }

            let mut stage_acceleration = vec![Vector::ZERO; n];
            field.accelerations(&state.masses, &displaced_positions, &mut stage_acceleration);
            velocity_stages.push(stage_velocity);
            acceleration_stages.push(stage_acceleration);
        }

        for (i, weight) in self.tableau.weights().iter().enumerate() {
            if *weight == 0.0 {
                continue;
            }
            let scale = dt * weight;
            for body in 0..n {
                state.positions[body] += velocity_stages[i][body] * scale;
                state.velocities[body] += acceleration_stages[i][body] * scale;
            }
        }

        state.accelerations = acceleration_stages.swap_remove(0);
    }

    fn convergence_order(&self) -> usize {
        self.tableau.order()
    }

    fn name(&self) -> &'static str {
        match self.tableau.order() {
            1 => "explicit_euler",
            2 => "runge_kutta_2",
            3 => "runge_kutta_3",
            _ => "runge_kutta_4",
        }
    }
}
