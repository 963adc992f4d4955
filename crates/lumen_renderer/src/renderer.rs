//! Tile-parallel frame rendering.
//!
//! The image is split into a fixed tile grid and every tile is rendered as
//! one rayon task writing into its own slice of the frame buffer. Each pixel
//! draws from a generator seeded by its coordinates, so the result does not
//! depend on how tiles are scheduled across threads.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::frame::{FrameBuffer, Pixel};
use crate::output::OutputSink;
use crate::sampling::{gen_f32, pixel_seed};
use crate::tile::TileGrid;
use crate::{BuiltScene, Color, PathIntegrator, RenderConfig, RenderResult};

/// Renders whole frames of a built scene.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    config: RenderConfig,
    integrator: PathIntegrator,
    grid: TileGrid,
}

impl FrameScheduler {
    /// Create a scheduler, rejecting configurations that cannot be rendered.
    pub fn new(config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        let integrator = PathIntegrator::from_config(&config);
        let grid = TileGrid::new(config.width, config.height, config.tiles_x, config.tiles_y);
        Ok(Self {
            config,
            integrator,
            grid,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn integrator(&self) -> &PathIntegrator {
        &self.integrator
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Render the full frame in parallel, one task per tile.
    pub fn render(&self, scene: &BuiltScene) -> RenderResult<FrameBuffer> {
        let config = &self.config;
        let camera_aspect = scene.camera().aspect_ratio();
        if (camera_aspect - config.aspect_ratio()).abs() > 1e-3 {
            log::warn!(
                "Camera aspect ratio {:.3} does not match image aspect ratio {:.3}",
                camera_aspect,
                config.aspect_ratio()
            );
        }

        let total_tiles = self.grid.tile_count();
        log::info!(
            "Rendering {}x{} @ {} spp in {} tiles ({} threads)",
            config.width,
            config.height,
            config.samples_per_pixel,
            total_tiles,
            rayon::current_num_threads()
        );

        let start = Instant::now();
        let mut frame = FrameBuffer::new(self.grid);
        let completed = Mutex::new(0usize);

        frame.tiles_mut().into_par_iter().for_each(|(tile, pixels)| {
            for ((x, y), pixel) in tile.pixels().zip(pixels.iter_mut()) {
                *pixel = self.render_pixel(scene, x, y);
            }

            let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
            *done += 1;
            log::debug!("Tile {} done ({}/{})", tile.index, *done, total_tiles);
        });

        log::info!("Rendered frame in {:?}", start.elapsed());
        Ok(frame)
    }

    /// Render the frame and emit it to `sink` in raster order.
    pub fn render_to(&self, scene: &BuiltScene, sink: &mut dyn OutputSink) -> RenderResult<()> {
        let frame = self.render(scene)?;
        frame.write_to(sink)
    }

    /// Average `samples_per_pixel` jittered paths through pixel `(x, y)`.
    ///
    /// The pixel's random stream is seeded from its coordinates alone.
    pub fn render_pixel(&self, scene: &BuiltScene, x: u32, y: u32) -> Pixel {
        let config = &self.config;
        let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, x, y));
        let camera = scene.camera();
        let (width, height) = (config.width as f32, config.height as f32);

        let mut sum = Color::ZERO;
        for _ in 0..config.samples_per_pixel {
            let u = (x as f32 + gen_f32(&mut rng)) / width;
            let v = (y as f32 + gen_f32(&mut rng)) / height;
            let ray = camera.get_ray(u, v, &mut rng);
            sum += self.integrator.cast_ray(&ray, scene, &mut rng);
        }

        let samples = config.samples_per_pixel;
        Pixel::new(sum / samples as f32, samples)
    }
}
