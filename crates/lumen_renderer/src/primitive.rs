//! Scene primitive capability and the intersection record it produces.

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::Material;

/// Record of a ray-primitive intersection.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Distance along the ray; inside the queried window
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> Intersection<'a> {
    /// Build a hit at distance `t`, orienting the normal against the ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a dyn Material) -> Self {
        // If the ray and normal point in the same direction, we're inside
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            p: ray.at(t),
            normal,
            t,
            front_face,
            material,
        }
    }
}

impl std::fmt::Debug for Intersection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intersection")
            .field("p", &self.p)
            .field("normal", &self.normal)
            .field("t", &self.t)
            .field("front_face", &self.front_face)
            .finish_non_exhaustive()
    }
}

/// A point drawn uniformly by area from a primitive's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub point: Vec3,
    /// Outward geometric normal at `point`
    pub normal: Vec3,
    /// Density with respect to surface area
    pub pdf: f32,
}

/// Trait for geometry that can live in a scene.
pub trait Primitive: Send + Sync {
    /// Closest intersection with `t` inside `ray_t`, if any.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>>;

    /// Get the axis-aligned bounding box of this primitive.
    fn bounding_box(&self) -> Aabb;

    /// Total surface area.
    fn area(&self) -> f32;

    /// Draw a point uniformly by area; `pdf` is `1 / area`.
    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample;

    fn material(&self) -> &dyn Material;
}

impl<P: Primitive + ?Sized> Primitive for Box<P> {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        (**self).intersect(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }

    fn area(&self) -> f32 {
        (**self).area()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        (**self).sample(rng)
    }

    fn material(&self) -> &dyn Material {
        (**self).material()
    }
}
