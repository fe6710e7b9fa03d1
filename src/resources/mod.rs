use bevy::prelude::*;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

/// Seedable generator owned by a single simulation
///
/// Random initial conditions are always drawn from an instance of this type,
/// never from thread-local state, so equal seeds give equal trajectories.
#[derive(Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::default(),
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}
