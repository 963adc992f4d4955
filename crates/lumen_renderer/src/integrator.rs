//! Unidirectional path tracing with next-event estimation.
//!
//! Every surface vertex adds an explicit light sample (the direct term) and
//! then continues with probability `continuation_probability` along a BRDF
//! sampled direction. Bounce rays that land on a light are dropped, since
//! that light was already counted by the direct term at the previous vertex.

use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::primitive::Intersection;
use crate::sampling::gen_f32;
use crate::{BuiltScene, Color, RenderConfig};

/// Near bound for every scene query.
const T_MIN: f32 = 1e-3;

/// Offset of secondary ray origins along the surface normal.
const RAY_OFFSET: f32 = 1e-4;

/// How close a shadow ray hit must be to the sampled light point.
const VISIBILITY_EPSILON: f32 = 1e-3;

/// Floor for pdf values before dividing by them.
const PDF_FLOOR: f32 = 1e-6;

/// Radiance estimate for one camera path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Color,
    /// Surface vertices where the path scattered or terminated.
    /// Zero when the camera ray escaped or looked straight at a light.
    pub vertices: u32,
}

/// Path tracing integrator with Russian roulette termination.
#[derive(Debug, Clone)]
pub struct PathIntegrator {
    /// Probability of extending the path at each vertex
    pub continuation_probability: f32,
    /// Hard limit on vertices per path
    pub max_depth: u32,
    /// Radiance for rays that leave the scene
    pub background: Color,
    /// Use the sky gradient instead of `background`
    pub sky_gradient: bool,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl PathIntegrator {
    pub fn new(continuation_probability: f32, max_depth: u32, background: Color) -> Self {
        Self {
            continuation_probability,
            max_depth,
            background,
            sky_gradient: false,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(
            config.continuation_probability,
            config.max_depth,
            config.background_color(),
        )
        .with_sky_gradient(config.sky_gradient)
    }

    pub fn with_sky_gradient(mut self, enabled: bool) -> Self {
        self.sky_gradient = enabled;
        self
    }

    /// Radiance arriving from outside the scene along `dir`.
    pub fn background(&self, dir: Vec3) -> Color {
        if self.sky_gradient {
            sky_gradient(dir)
        } else {
            self.background
        }
    }

    /// Estimate the radiance arriving along `ray`.
    pub fn cast_ray(&self, ray: &Ray, scene: &BuiltScene, rng: &mut dyn RngCore) -> Color {
        self.trace(ray, scene, rng).radiance
    }

    /// Trace one path and report its radiance and length.
    pub fn trace(&self, ray: &Ray, scene: &BuiltScene, rng: &mut dyn RngCore) -> PathSample {
        let window = Interval::new(T_MIN, f32::INFINITY);

        let Some(mut hit) = scene.intersect(ray, window) else {
            return PathSample {
                radiance: self.background(ray.direction()),
                vertices: 0,
            };
        };
        if hit.material.has_emission() {
            return PathSample {
                radiance: emitted(&hit),
                vertices: 0,
            };
        }

        let p = self.continuation_probability;
        let mut ray_dir = ray.direction();
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut vertices = 0;

        while vertices < self.max_depth {
            vertices += 1;
            radiance += throughput * self.direct_lighting(&hit, ray_dir, scene, rng);

            // Russian roulette
            if gen_f32(rng) >= p {
                break;
            }

            let material = hit.material;
            let scatter_dir = material.sample(ray_dir, hit.normal, rng);
            let cos_theta = hit.normal.dot(scatter_dir);
            if cos_theta <= 0.0 {
                break;
            }
            let pdf = material.pdf(ray_dir, scatter_dir, hit.normal).max(PDF_FLOOR);
            let weight = material.eval(ray_dir, scatter_dir, hit.normal) * cos_theta / (pdf * p);

            let bounce = Ray::new(hit.p + hit.normal * RAY_OFFSET, scatter_dir);
            match scene.intersect(&bounce, window) {
                None => {
                    radiance += throughput * weight * self.background(scatter_dir);
                    break;
                }
                Some(next) if next.material.has_emission() => break,
                Some(next) => {
                    throughput *= weight;
                    hit = next;
                    ray_dir = scatter_dir;
                }
            }
        }

        PathSample {
            radiance: non_negative(radiance),
            vertices,
        }
    }

    /// Radiance reflected at `hit` from one sampled light point.
    ///
    /// `ray_dir` is the direction of the ray that arrived at `hit`. Returns
    /// zero for scenes without emissive surfaces and for occluded samples.
    pub fn direct_lighting(
        &self,
        hit: &Intersection<'_>,
        ray_dir: Vec3,
        scene: &BuiltScene,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Ok(light) = scene.sample_light(rng) else {
            return Color::ZERO;
        };

        let origin = hit.p + hit.normal * RAY_OFFSET;
        let to_light = light.point - origin;
        let dist_squared = to_light.length_squared();
        if dist_squared <= f32::EPSILON {
            return Color::ZERO;
        }
        let dist = dist_squared.sqrt();
        let light_dir = to_light / dist;

        let cos_surface = hit.normal.dot(light_dir);
        let cos_light = light.normal.dot(-light_dir);
        if cos_surface <= 0.0 || cos_light <= 0.0 {
            return Color::ZERO;
        }

        let shadow = Ray::new(origin, light_dir);
        let visible = scene
            .intersect(&shadow, Interval::new(T_MIN, dist + VISIBILITY_EPSILON))
            .is_some_and(|h| (h.t - dist).abs() < VISIBILITY_EPSILON && h.material.has_emission());
        if !visible {
            return Color::ZERO;
        }

        let f = hit.material.eval(ray_dir, light_dir, hit.normal);
        light.emission * f * cos_surface * cos_light / dist_squared / light.pdf.max(PDF_FLOOR)
    }
}

/// Lights emit from their front face only.
fn emitted(hit: &Intersection<'_>) -> Color {
    if hit.front_face {
        hit.material.emission()
    } else {
        Color::ZERO
    }
}

/// White at the nadir, light blue at the zenith.
fn sky_gradient(dir: Vec3) -> Color {
    let a = 0.5 * (dir.normalize_or_zero().y + 1.0);
    Color::ONE * (1.0 - a) + Color::new(0.5, 0.7, 1.0) * a
}

/// Clamp each component to `>= 0`, mapping NaN to zero.
fn non_negative(c: Color) -> Color {
    let clamp = |v: f32| if v > 0.0 { v } else { 0.0 };
    Color::new(clamp(c.x), clamp(c.y), clamp(c.z))
}
