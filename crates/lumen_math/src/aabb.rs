use crate::{Interval, Ray, Vec3};

/// Thinnest extent an axis may have before it gets padded.
const MIN_EXTENT: f32 = 0.0001;

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// The default box is a zero-sized sentinel at the origin; use
/// [`Aabb::EMPTY`] as the identity when folding boxes together.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corner points, in any order.
    ///
    /// Axes thinner than `MIN_EXTENT` are padded so flat geometry
    /// (axis-aligned triangles and quads) still passes the slab test.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            min: a.min(b),
            max: a.max(b),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// A degenerate box holding a single point, unpadded.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// False for the zero-sized default sentinel.
    pub fn is_available(&self) -> bool {
        self.min != self.max
    }

    /// Extent of the box along axis `n` (0=X, 1=Y, 2=Z) as an interval.
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. Zero direction components produce infinite reciprocals,
    /// and the resulting NaNs fall out of `f32::max`/`f32::min`, so
    /// axis-parallel rays need no special case.
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> bool {
        let origin = ray.origin();
        let inv = ray.inv_direction();

        for axis in 0..3 {
            let mut t0 = (self.min[axis] - origin[axis]) * inv[axis];
            let mut t1 = (self.max[axis] - origin[axis]) * inv[axis];
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties go to the lower axis.
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;

        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        for axis in 0..3 {
            let interval = self.axis_interval(axis);
            if interval.size() < MIN_EXTENT {
                let padded = interval.expand(MIN_EXTENT);
                self.min[axis] = padded.min;
                self.max[axis] = padded.max;
            }
        }
    }

    /// Identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_flat_box_is_padded() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        assert!(aabb.max.y > aabb.min.y);

        // A ray straight down onto the flat box must still register.
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_default_is_unavailable_sentinel() {
        let aabb = Aabb::default();
        assert!(!aabb.is_available());
        assert!(Aabb::from_points(Vec3::ZERO, Vec3::ONE).is_available());
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Window ends before the box
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_hit_ray_on_slab_boundary_plane() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);

        // Origin lies exactly on the min-x plane with zero x-direction.
        let ray = Ray::new(Vec3::new(0.0, 0.5, -3.0), Vec3::Z);
        assert!(aabb.hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_aabb_longest_axis() {
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).longest_axis(), 0);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).longest_axis(), 1);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).longest_axis(), 2);
        assert_eq!(Aabb::from_points(Vec3::ZERO, Vec3::ONE).longest_axis(), 0);
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::splat(10.0));
        assert_eq!(aabb.centroid(), Vec3::splat(5.0));
    }

    #[test]
    fn test_empty_is_surrounding_identity() {
        let aabb = Aabb::from_points(Vec3::new(-2.0, 0.0, 1.0), Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &aabb), aabb);
    }

    fn arb_aabb() -> impl Strategy<Value = Aabb> {
        (
            prop::array::uniform3(-1e3f32..1e3f32),
            prop::array::uniform3(-1e3f32..1e3f32),
        )
            .prop_map(|(a, b)| Aabb::from_points(Vec3::from(a), Vec3::from(b)))
    }

    proptest! {
        #[test]
        fn surrounding_is_commutative(a in arb_aabb(), b in arb_aabb()) {
            prop_assert_eq!(Aabb::surrounding(&a, &b), Aabb::surrounding(&b, &a));
        }

        #[test]
        fn surrounding_is_associative(a in arb_aabb(), b in arb_aabb(), c in arb_aabb()) {
            let left = Aabb::surrounding(&Aabb::surrounding(&a, &b), &c);
            let right = Aabb::surrounding(&a, &Aabb::surrounding(&b, &c));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn surrounding_contains_both(a in arb_aabb(), b in arb_aabb()) {
            let merged = Aabb::surrounding(&a, &b);
            prop_assert!(merged.contains(&a));
            prop_assert!(merged.contains(&b));
        }
    }
}
