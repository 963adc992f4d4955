//! Random sampling helpers.
//!
//! Every routine draws a fixed number of values from the generator, so a
//! seeded stream always reproduces the same path.

use std::f32::consts::PI;

use lumen_math::{Vec2, Vec3};
use rand::{Rng, RngCore};

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let theta = 2.0 * PI * gen_f32(rng);
    let cos_phi = 2.0 * gen_f32(rng) - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

    Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}

/// Uniformly distributed direction on the hemisphere around `normal`.
pub fn random_in_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let v = random_unit_vector(rng);
    if v.dot(normal) > 0.0 {
        v
    } else {
        -v
    }
}

/// Uniformly distributed point in the unit disk.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    let theta = 2.0 * PI * gen_f32(rng);
    let radius = gen_f32(rng).sqrt();
    Vec2::new(radius * theta.cos(), radius * theta.sin())
}

/// Barycentric weights `(b1, b2)` uniformly distributed over a triangle.
pub fn uniform_triangle(rng: &mut dyn RngCore) -> (f32, f32) {
    let su = gen_f32(rng).sqrt();
    let v = gen_f32(rng);
    (1.0 - su, v * su)
}

/// Seed for the random stream of pixel `(x, y)`.
///
/// SplitMix64 finalizer over the base seed and pixel coordinates, so the
/// stream depends only on the pixel and never on which worker renders it.
pub fn pixel_seed(seed: u64, x: u32, y: u32) -> u64 {
    let mut z = seed
        ^ ((x as u64) << 32 | y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unit_vectors_are_unit_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hemisphere_samples_face_normal() {
        let mut rng = StdRng::seed_from_u64(2);
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        for _ in 0..1000 {
            assert!(random_in_hemisphere(normal, &mut rng).dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_unit_disk_samples_inside_disk() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(random_in_unit_disk(&mut rng).length() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_triangle_barycentrics_are_valid() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let (b1, b2) = uniform_triangle(&mut rng);
            assert!(b1 >= 0.0 && b2 >= 0.0 && b1 + b2 <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_pixel_seeds_differ_per_pixel() {
        let a = pixel_seed(0, 0, 0);
        assert_ne!(a, pixel_seed(0, 1, 0));
        assert_ne!(a, pixel_seed(0, 0, 1));
        assert_ne!(a, pixel_seed(1, 0, 0));
        assert_eq!(pixel_seed(9, 3, 4), pixel_seed(9, 3, 4));
    }
}
