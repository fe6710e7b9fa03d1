use crate::resources::SharedRng;
use rand::Rng;

/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for positions, velocities, and accelerations
pub type Vector = bevy::math::DVec3;

/// Draw a vector with each component uniform in `[-extent, extent)`
///
/// A non-positive extent yields the zero vector rather than an empty range.
pub fn random_vector_in_cube(rng: &mut SharedRng, extent: Scalar) -> Vector {
    if extent <= 0.0 {
        return Vector::ZERO;
    }

    Vector::new(
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
        rng.random_range(-extent..extent),
    )
}

/// Euclidean norm evaluated through `libm` so results match across platforms
#[inline]
pub fn norm(v: Vector) -> Scalar {
    libm::sqrt(v.x * v.x + v.y * v.y + v.z * v.z)
}
