//! Material trait and the diffuse/emissive materials.
//!
//! A material is consulted through three calls: `eval` for the BRDF value,
//! `sample` for an importance-sampled bounce direction and `pdf` for the
//! solid-angle density of that direction. Direction arguments follow the
//! ray: `ray_dir` is the direction the incoming ray travels, `scatter_dir`
//! points away from the surface toward the next vertex or light.

use std::f32::consts::PI;

use lumen_math::Vec3;
use rand::RngCore;

use crate::sampling::random_in_hemisphere;

/// Color type alias (linear RGB radiance)
pub type Color = Vec3;

/// Emission below this length counts as none.
const EMISSION_EPSILON: f32 = 1e-8;

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Radiance emitted by the surface. Most materials emit nothing.
    fn emission(&self) -> Color {
        Color::ZERO
    }

    fn has_emission(&self) -> bool {
        self.emission().length() > EMISSION_EPSILON
    }

    /// BRDF value for light leaving along `-ray_dir` and arriving from `scatter_dir`.
    fn eval(&self, ray_dir: Vec3, scatter_dir: Vec3, normal: Vec3) -> Color;

    /// Importance-sample a scatter direction.
    fn sample(&self, ray_dir: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Solid-angle density with which `sample` produces `scatter_dir`.
    fn pdf(&self, ray_dir: Vec3, scatter_dir: Vec3, normal: Vec3) -> f32;
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn eval(&self, _ray_dir: Vec3, scatter_dir: Vec3, normal: Vec3) -> Color {
        if normal.dot(scatter_dir) > 0.0 {
            self.albedo / PI
        } else {
            Color::ZERO
        }
    }

    fn sample(&self, _ray_dir: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        random_in_hemisphere(normal, rng)
    }

    fn pdf(&self, _ray_dir: Vec3, scatter_dir: Vec3, normal: Vec3) -> f32 {
        // uniform hemisphere
        if normal.dot(scatter_dir) > 0.0 {
            0.5 / PI
        } else {
            0.0
        }
    }
}

/// Diffuse light emitter.
///
/// Lights do not reflect; paths that reach one end there.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn emission(&self) -> Color {
        self.emit
    }

    fn eval(&self, _ray_dir: Vec3, _scatter_dir: Vec3, _normal: Vec3) -> Color {
        Color::ZERO
    }

    fn sample(&self, _ray_dir: Vec3, normal: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        normal
    }

    fn pdf(&self, _ray_dir: Vec3, _scatter_dir: Vec3, _normal: Vec3) -> f32 {
        0.0
    }
}
