//! Direct-summation Newtonian gravity
//!
//! Every unordered pair of bodies is visited exactly once. The force on the
//! first body of the pair is accumulated as-is and its negation is accumulated
//! on the second, so the pairwise forces cancel exactly and the total momentum
//! change of a closed system is zero up to rounding in the final division by
//! mass.

use super::integrators::AccelerationField;
use super::math::{Scalar, Vector, norm};

/// Distance added to every pair separation to keep coincident bodies finite
pub const SOFTENING: Scalar = 1e-6;

/// Pairwise gravitational acceleration evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonianGravity {
    pub g: Scalar,
    pub softening: Scalar,
}

impl NewtonianGravity {
    pub fn new(g: Scalar) -> Self {
        Self {
            g,
            softening: SOFTENING,
        }
    }

    /// Force exerted on body `i` by body `j`
    ///
    /// `F_ij = G m_i m_j r_ij / (|r_ij| + softening)^3` with `r_ij = p_j - p_i`.
    #[inline]
    pub fn pairwise_force(
        &self,
        position_i: Vector,
        mass_i: Scalar,
        position_j: Vector,
        mass_j: Scalar,
    ) -> Vector {
        let r = position_j - position_i;
        let d = norm(r) + self.softening;
        r * (self.g * mass_i * mass_j / (d * d * d))
    }

    /// Accumulate net accelerations for every body into `out`
    ///
    /// `out` is overwritten. Masses must be non-zero; this is not checked.
    pub fn compute(&self, positions: &[Vector], masses: &[Scalar], out: &mut [Vector]) {
        debug_assert_eq!(positions.len(), masses.len());
        debug_assert_eq!(positions.len(), out.len());

        out.fill(Vector::ZERO);

        let n = positions.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let force = self.pairwise_force(positions[i], masses[i], positions[j], masses[j]);
                out[i] += force;
                out[j] -= force;
            }
        }

        for (acceleration, mass) in out.iter_mut().zip(masses) {
            *acceleration /= *mass;
        }
    }
}

impl AccelerationField for NewtonianGravity {
    fn accelerations(&self, masses: &[Scalar], positions: &[Vector], out: &mut [Vector]) {
        self.compute(positions, masses, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::math::random_vector_in_cube;
    use crate::resources::SharedRng;
    use rand::Rng;

    fn random_ensemble(n: usize, seed: u64) -> (Vec<Vector>, Vec<Scalar>) {
        let mut rng = SharedRng::from_seed(seed);
        let positions = (0..n)
            .map(|_| random_vector_in_cube(&mut rng, 100.0))
            .collect();
        let masses = (0..n).map(|_| rng.random_range(0.01..2.0)).collect();
        (positions, masses)
    }

    #[test]
    fn test_pairwise_force_is_antisymmetric() {
        let gravity = NewtonianGravity::new(6.674e-3);
        let (positions, masses) = random_ensemble(12, 3);

        for i in 0..positions.len() {
            for j in 0..positions.len() {
                if i == j {
                    continue;
                }
                let f_ij = gravity.pairwise_force(positions[i], masses[i], positions[j], masses[j]);
                let f_ji = gravity.pairwise_force(positions[j], masses[j], positions[i], masses[i]);
                assert_eq!(f_ij, -f_ji, "pair ({i}, {j}) is not antisymmetric");
            }
        }
    }

    #[test]
    fn test_total_momentum_change_vanishes() {
        let gravity = NewtonianGravity::new(1.0);
        let (positions, masses) = random_ensemble(50, 19);
        let mut accelerations = vec![Vector::ZERO; positions.len()];

        gravity.compute(&positions, &masses, &mut accelerations);

        let net: Vector = accelerations
            .iter()
            .zip(&masses)
            .map(|(a, m)| *a * *m)
            .sum();
        let scale: Scalar = accelerations
            .iter()
            .zip(&masses)
            .map(|(a, m)| (*a * *m).length())
            .sum();

        assert!(
            net.length() <= 1e-9 * scale,
            "net force {net:?} is not negligible against scale {scale}"
        );
    }

    #[test]
    fn test_two_body_magnitude() {
        let gravity = NewtonianGravity::new(1.0);
        let positions = [Vector::ZERO, Vector::new(2.0, 0.0, 0.0)];
        let masses = [3.0, 5.0];
        let mut out = [Vector::ZERO; 2];

        gravity.compute(&positions, &masses, &mut out);

        let d = 2.0 + SOFTENING;
        let expected_on_first = 5.0 * 2.0 / (d * d * d);
        let expected_on_second = 3.0 * 2.0 / (d * d * d);
        assert!((out[0].x - expected_on_first).abs() < 1e-12);
        assert!((out[1].x + expected_on_second).abs() < 1e-12);
        assert_eq!(out[0].y, 0.0);
        assert_eq!(out[1].z, 0.0);
    }

    #[test]
    fn test_coincident_bodies_stay_finite() {
        let gravity = NewtonianGravity::new(1.0);
        let positions = [Vector::splat(1.0), Vector::splat(1.0)];
        let masses = [1.0, 1.0];
        let mut out = [Vector::splat(9.0); 2];

        gravity.compute(&positions, &masses, &mut out);

        assert!(out.iter().all(|a| a.is_finite()));
        assert_eq!(out[0], Vector::ZERO);
        assert_eq!(out[1], Vector::ZERO);
    }

    #[test]
    fn test_single_body_feels_nothing() {
        let gravity = NewtonianGravity::new(10.0);
        let mut out = [Vector::splat(1.0)];

        gravity.compute(&[Vector::new(4.0, 5.0, 6.0)], &[2.0], &mut out);

        assert_eq!(out[0], Vector::ZERO);
    }
}
