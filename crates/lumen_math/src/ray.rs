use crate::Vec3;

/// A ray in 3D space.
///
/// The direction is normalized on construction, so `t` along the ray is a
/// true distance. The component-wise reciprocal of the direction is cached
/// for slab tests; axis-parallel rays get `±inf` there, which the slab test
/// relies on instead of branching.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a new ray. `direction` does not need to be unit length.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
