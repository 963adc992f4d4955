//! Cornell box example.
//!
//! Builds the classic box from quads, adds two spheres, renders it in
//! parallel and saves a PNG.
//!
//! Usage: `cargo run --release --example cornell_box [config.json] [output.png]`

use std::sync::Arc;

use anyhow::Context;
use lumen_renderer::{
    Camera, Color, DiffuseLight, FrameScheduler, ImageSink, Lambertian, Material, RenderConfig,
    Scene, Sphere, TriangleMesh, Vec3,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RenderConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => RenderConfig {
            width: 400,
            height: 400,
            samples_per_pixel: 64,
            ..Default::default()
        },
    };
    let output = args.next().unwrap_or_else(|| "cornell_box.png".to_string());

    let start = std::time::Instant::now();
    let scene = build_scene(config.aspect_ratio())?.build()?;
    log::info!("Scene built in {:?}", start.elapsed());

    let scheduler = FrameScheduler::new(config)?;
    let mut sink = ImageSink::new(&output);
    scheduler
        .render_to(&scene, &mut sink)
        .with_context(|| format!("Failed to render to {output}"))?;

    Ok(())
}

/// Box of side 5.55 with its open side facing -z toward the camera.
fn build_scene(aspect_ratio: f32) -> anyhow::Result<Scene> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(15.0)));

    let camera = Camera::new()
        .with_aspect_ratio(aspect_ratio)
        .with_position(
            Vec3::new(2.775, 2.775, -8.0), // look_from
            Vec3::new(2.775, 2.775, 0.0),  // look_at
            Vec3::Y,                       // vup
        )
        .with_lens(40.0, 0.0, 10.0);
    let mut scene = Scene::new(camera);

    let s = 5.55;
    // Each quad's normal (edge_u x edge_v) points into the box.
    let walls = [
        // left in frame (x = s), red
        (Vec3::new(s, 0.0, 0.0), Vec3::new(0.0, 0.0, s), Vec3::new(0.0, s, 0.0), red),
        // right in frame (x = 0), green
        (Vec3::ZERO, Vec3::new(0.0, s, 0.0), Vec3::new(0.0, 0.0, s), green),
        // floor
        (Vec3::ZERO, Vec3::new(0.0, 0.0, s), Vec3::new(s, 0.0, 0.0), white.clone()),
        // ceiling
        (Vec3::new(0.0, s, 0.0), Vec3::new(s, 0.0, 0.0), Vec3::new(0.0, 0.0, s), white.clone()),
        // back
        (Vec3::new(0.0, 0.0, s), Vec3::new(0.0, s, 0.0), Vec3::new(s, 0.0, 0.0), white.clone()),
    ];
    for (corner, edge_u, edge_v, material) in walls {
        scene.add_primitive(TriangleMesh::quad(corner, edge_u, edge_v, material)?);
    }

    // Light just below the ceiling, facing down
    scene.add_primitive(TriangleMesh::quad(
        Vec3::new(2.13, 5.54, 2.27),
        Vec3::new(1.3, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.05),
        light,
    )?);

    scene.add_primitive(Sphere::new(Vec3::new(1.85, 0.9, 1.7), 0.9, white.clone()));
    scene.add_primitive(Sphere::new(Vec3::new(3.7, 1.2, 3.6), 1.2, white));

    log::info!("Cornell box: {} primitives", scene.len());
    Ok(scene)
}
