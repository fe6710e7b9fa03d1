//! Conserved quantities of an ensemble, used for progress reports and tests

use super::gravity::SOFTENING;
use super::math::{Scalar, Vector, norm};
use super::state::BodyState;

pub fn kinetic_energy(state: &BodyState) -> Scalar {
    state
        .masses
        .iter()
        .zip(&state.velocities)
        .map(|(m, v)| 0.5 * m * v.length_squared())
        .sum()
}

/// Pairwise potential energy with the same softened distance as the force model
pub fn potential_energy(state: &BodyState, g: Scalar) -> Scalar {
    let n = state.len();
    let mut energy = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let d = norm(state.positions[j] - state.positions[i]) + SOFTENING;
            energy -= g * state.masses[i] * state.masses[j] / d;
        }
    }
    energy
}

pub fn total_energy(state: &BodyState, g: Scalar) -> Scalar {
    kinetic_energy(state) + potential_energy(state, g)
}

pub fn total_momentum(state: &BodyState) -> Vector {
    state
        .masses
        .iter()
        .zip(&state.velocities)
        .map(|(m, v)| *v * *m)
        .sum()
}

/// Mass-weighted mean position, or the origin for an empty ensemble
pub fn barycenter(state: &BodyState) -> Vector {
    let total_mass = state.total_mass();
    if total_mass <= 0.0 {
        return Vector::ZERO;
    }

    let weighted: Vector = state
        .masses
        .iter()
        .zip(&state.positions)
        .map(|(m, p)| *p * *m)
        .sum();
    weighted / total_mass
}

/// `|current - initial| / |initial|`, falling back to the absolute change near zero
pub fn relative_drift(initial: Scalar, current: Scalar) -> Scalar {
    let change = (current - initial).abs();
    if initial.abs() > Scalar::EPSILON {
        change / initial.abs()
    } else {
        change
    }
}
