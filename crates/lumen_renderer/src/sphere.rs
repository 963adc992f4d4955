//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::primitive::{Intersection, Primitive, SurfaceSample};
use crate::sampling::random_unit_vector;
use crate::Material;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// A negative radius keeps the same surface but flips the outward normal
    /// inward, which models the inside wall of a hollow shell.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let rvec = Vec3::splat(radius.abs());
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Signed radius as given to [`Sphere::new`].
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Primitive for Sphere {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.contains(root) {
            root = (h + sqrtd) / a;
            if !ray_t.contains(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(Intersection::new(ray, root, outward_normal, self.material.as_ref()))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let normal = random_unit_vector(rng);
        SurfaceSample {
            point: self.center + self.radius * normal,
            normal,
            pdf: 1.0 / self.area().max(f32::MIN_POSITIVE),
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
