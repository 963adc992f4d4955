//! Statistical checks of the path tracing estimator.
//!
//! Each test averages many independent samples from a seeded generator and
//! compares the mean against a closed-form expectation.

use std::sync::Arc;

use lumen_renderer::{
    Camera, Color, DiffuseLight, Interval, Lambertian, Material, PathIntegrator, Ray, Scene,
    Sphere, TriangleMesh, Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ALBEDO: f32 = 0.5;
const LIGHT_HALF_SIZE: f64 = 0.5;
const LIGHT_DISTANCE: f64 = 1.0;

/// Lambertian floor in the z = 0 plane under a unit-radiance square light
/// centered on the z axis, facing down.
fn receiver_under_light() -> lumen_renderer::BuiltScene {
    let floor: Arc<dyn Material> = Arc::new(Lambertian::new(Vec3::splat(ALBEDO)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Vec3::ONE));
    let h = LIGHT_HALF_SIZE as f32;
    let d = LIGHT_DISTANCE as f32;

    let mut scene = Scene::new(Camera::new());
    scene.add_primitive(
        TriangleMesh::quad(
            // Shifted so the quad's diagonal misses the origin
            Vec3::new(-5.0, -4.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
            floor,
        )
        .unwrap(),
    );
    scene.add_primitive(
        TriangleMesh::quad(
            Vec3::new(-h, -h, d),
            Vec3::new(0.0, 2.0 * h, 0.0),
            Vec3::new(2.0 * h, 0.0, 0.0),
            light,
        )
        .unwrap(),
    );
    scene.build().unwrap()
}

/// Radiance reflected straight up from the point under the light's center.
///
/// Irradiance from a square of half-size h at height d is
/// `4 Le s atan(s)` with `s = h / sqrt(h^2 + d^2)`; a Lambertian surface
/// reflects `albedo / pi` of it.
fn expected_reflected_radiance() -> f64 {
    let h = LIGHT_HALF_SIZE;
    let d = LIGHT_DISTANCE;
    let s = h / (h * h + d * d).sqrt();
    let irradiance = 4.0 * s * s.atan();
    ALBEDO as f64 / std::f64::consts::PI * irradiance
}

fn mean(samples: impl Iterator<Item = Color>, n: usize) -> Color {
    samples.fold(Color::ZERO, |acc, c| acc + c) / n as f32
}

#[test]
fn direct_lighting_converges_to_closed_form() {
    let scene = receiver_under_light();
    let integrator = PathIntegrator::default();
    let mut rng = StdRng::seed_from_u64(2024);

    let ray = Ray::new(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -1.0));
    let hit = scene
        .intersect(&ray, Interval::new(1e-3, f32::INFINITY))
        .unwrap();
    assert!(hit.p.length() < 1e-4);

    let n = 20_000;
    let estimate = mean(
        (0..n).map(|_| integrator.direct_lighting(&hit, ray.direction(), &scene, &mut rng)),
        n,
    );

    let expected = expected_reflected_radiance() as f32;
    for channel in estimate.to_array() {
        let error = (channel - expected).abs() / expected;
        assert!(error < 0.03, "estimate {channel}, expected {expected}");
    }
}

#[test]
fn full_path_matches_direct_term_when_bounces_only_find_the_light() {
    // Bounces from the floor either escape into a black background or land
    // on the light, whose contribution was already taken by the direct term.
    let scene = receiver_under_light();
    let integrator = PathIntegrator::default();
    let mut rng = StdRng::seed_from_u64(77);

    let ray = Ray::new(Vec3::new(0.0, 0.0, 0.5), Vec3::new(0.0, 0.0, -1.0));
    let n = 20_000;
    let estimate = mean((0..n).map(|_| integrator.cast_ray(&ray, &scene, &mut rng)), n);

    let expected = expected_reflected_radiance() as f32;
    let error = (estimate.x - expected).abs() / expected;
    assert!(error < 0.03, "estimate {}, expected {expected}", estimate.x);
}

/// Closed Lambertian sphere with no lights: every bounce finds another
/// surface, so only Russian roulette ends a path.
fn mean_path_length(continuation_probability: f32, seed: u64) -> f64 {
    let mut scene = Scene::new(Camera::new());
    scene.add_primitive(Sphere::new(
        Vec3::ZERO,
        10.0,
        Arc::new(Lambertian::new(Vec3::splat(0.7))),
    ));
    let scene = scene.build().unwrap();

    let integrator = PathIntegrator::new(continuation_probability, 100_000, Color::ZERO);
    let mut rng = StdRng::seed_from_u64(seed);
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, 1.0, -0.2));

    let n = 20_000;
    let total: u64 = (0..n)
        .map(|_| {
            let sample = integrator.trace(&ray, &scene, &mut rng);
            // No emitters anywhere, so nothing reaches the camera.
            assert_eq!(sample.radiance, Color::ZERO);
            sample.vertices as u64
        })
        .sum();
    total as f64 / n as f64
}

#[test]
fn mean_path_length_follows_continuation_probability() {
    let mean = mean_path_length(0.8, 11);
    assert!((mean - 5.0).abs() < 0.15, "mean path length {mean}, expected 5");

    let mean = mean_path_length(0.5, 12);
    assert!((mean - 2.0).abs() < 0.05, "mean path length {mean}, expected 2");
}
