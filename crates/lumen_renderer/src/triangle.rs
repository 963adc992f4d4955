//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::primitive::{Intersection, Primitive, SurfaceSample};
use crate::sampling::uniform_triangle;
use crate::Material;

/// A triangle primitive.
#[derive(Clone)]
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Pre-computed face normal (unit length, from winding order)
    normal: Vec3,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The face normal follows the right-hand rule over `v0 -> v1 -> v2`.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);

        // from_points pads thin dimensions to avoid degenerate AABBs
        let bbox = Aabb::surrounding(&Aabb::from_points(v0, v1), &Aabb::from_points(v2, v2));

        Self {
            v0,
            v1,
            v2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }
}

impl Primitive for Triangle {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some(Intersection::new(ray, t, self.normal, self.material.as_ref()))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        let (b1, b2) = uniform_triangle(rng);
        let point = self.v0 + b1 * (self.v1 - self.v0) + b2 * (self.v2 - self.v0);
        SurfaceSample {
            point,
            normal: self.normal,
            pdf: 1.0 / self.area.max(f32::MIN_POSITIVE),
        }
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
