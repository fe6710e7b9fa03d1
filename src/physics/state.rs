//! Body ensemble storage
//!
//! Per-body quantities are kept as parallel vectors rather than a vector of
//! structs so the force model and integrators can hand whole position and
//! velocity slices to each other.

use super::math::{Scalar, Vector, random_vector_in_cube};
use crate::resources::SharedRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One row of an explicit initial-condition table
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BodyRecord {
    pub mass: Scalar,
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
    pub vx: Scalar,
    pub vy: Scalar,
    pub vz: Scalar,
}

impl BodyRecord {
    pub fn position(&self) -> Vector {
        Vector::new(self.x, self.y, self.z)
    }

    pub fn velocity(&self) -> Vector {
        Vector::new(self.vx, self.vy, self.vz)
    }
}

/// Ranges for randomly generated ensembles
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RandomBodyRanges {
    /// Lower mass bound; kept above zero so accelerations stay defined
    pub mass_min: Scalar,
    pub mass_max: Scalar,
    /// Positions are uniform in `[-position_extent, position_extent)` per axis
    pub position_extent: Scalar,
    /// Velocities are uniform in `[-velocity_extent, velocity_extent)` per axis
    pub velocity_extent: Scalar,
}

impl Default for RandomBodyRanges {
    fn default() -> Self {
        Self {
            mass_min: 0.01,
            mass_max: 2.0,
            position_extent: 100.0,
            velocity_extent: 1.0,
        }
    }
}

/// Masses, positions, velocities and accelerations of every body
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyState {
    pub masses: Vec<Scalar>,
    pub positions: Vec<Vector>,
    pub velocities: Vec<Vector>,
    /// Accelerations evaluated at the start of the most recent step
    pub accelerations: Vec<Vector>,
}

impl BodyState {
    pub fn from_records(records: &[BodyRecord]) -> Self {
        Self {
            masses: records.iter().map(|record| record.mass).collect(),
            positions: records.iter().map(BodyRecord::position).collect(),
            velocities: records.iter().map(BodyRecord::velocity).collect(),
            accelerations: vec![Vector::ZERO; records.len()],
        }
    }

    /// Draw `count` bodies from `rng`
    ///
    /// Each body consumes its mass, then position, then velocity from the
    /// generator, so the ensemble depends only on the seed and the ranges.
    pub fn random(count: usize, ranges: &RandomBodyRanges, rng: &mut SharedRng) -> Self {
        let mut state = Self::with_capacity(count);

        for _ in 0..count {
            let mass = if ranges.mass_max > ranges.mass_min {
                rng.random_range(ranges.mass_min..ranges.mass_max)
            } else {
                ranges.mass_min
            };
            state.masses.push(mass);
            state
                .positions
                .push(random_vector_in_cube(rng, ranges.position_extent));
            state
                .velocities
                .push(random_vector_in_cube(rng, ranges.velocity_extent));
            state.accelerations.push(Vector::ZERO);
        }

        state
    }

    fn with_capacity(count: usize) -> Self {
        Self {
            masses: Vec::with_capacity(count),
            positions: Vec::with_capacity(count),
            velocities: Vec::with_capacity(count),
            accelerations: Vec::with_capacity(count),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn total_mass(&self) -> Scalar {
        self.masses.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mass: Scalar, x: Scalar, vy: Scalar) -> BodyRecord {
        BodyRecord {
            mass,
            x,
            y: 0.0,
            z: 0.0,
            vx: 0.0,
            vy,
            vz: 0.0,
        }
    }

    #[test]
    fn test_from_records_shapes() {
        let state = BodyState::from_records(&[record(1.0, -0.5, 0.7), record(2.0, 0.5, -0.7)]);

        assert_eq!(state.len(), 2);
        assert_eq!(state.positions.len(), 2);
        assert_eq!(state.velocities.len(), 2);
        assert_eq!(state.accelerations.len(), 2);
        assert_eq!(state.positions[1], Vector::new(0.5, 0.0, 0.0));
        assert_eq!(state.velocities[0], Vector::new(0.0, 0.7, 0.0));
        assert_eq!(state.total_mass(), 3.0);
    }

    #[test]
    fn test_random_respects_ranges() {
        let ranges = RandomBodyRanges::default();
        let mut rng = SharedRng::from_seed(99);
        let state = BodyState::random(200, &ranges, &mut rng);

        assert_eq!(state.len(), 200);
        assert!(
            state
                .masses
                .iter()
                .all(|m| (ranges.mass_min..ranges.mass_max).contains(m))
        );
        assert!(state.positions.iter().all(|p| p.abs().max_element() < 100.0));
        assert!(state.velocities.iter().all(|v| v.abs().max_element() < 1.0));
        assert!(state.accelerations.iter().all(|a| *a == Vector::ZERO));
    }

    #[test]
    fn test_random_is_reproducible() {
        let ranges = RandomBodyRanges::default();
        let a = BodyState::random(16, &ranges, &mut SharedRng::from_seed(5));
        let b = BodyState::random(16, &ranges, &mut SharedRng::from_seed(5));
        let c = BodyState::random(16, &ranges, &mut SharedRng::from_seed(6));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_degenerate_mass_range_uses_lower_bound() {
        let ranges = RandomBodyRanges {
            mass_min: 1.5,
            mass_max: 1.5,
            ..Default::default()
        };
        let state = BodyState::random(3, &ranges, &mut SharedRng::from_seed(1));
        assert_eq!(state.masses, vec![1.5; 3]);
    }
}
