//! Lumen - CPU Path Tracing
//!
//! A Monte Carlo path tracer with next-event estimation and Russian
//! roulette, a median-split BVH over the scene, and tile-parallel frame
//! rendering with deterministic per-pixel random streams.

mod bvh;
mod camera;
mod config;
mod error;
mod frame;
mod integrator;
mod material;
mod mesh;
mod output;
mod primitive;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod tile;
mod triangle;

pub use bvh::{BvhNode, BvhTree};
pub use camera::Camera;
pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use frame::{FrameBuffer, Pixel};
pub use integrator::{PathIntegrator, PathSample};
pub use material::{Color, DiffuseLight, Lambertian, Material};
pub use mesh::TriangleMesh;
pub use output::{color_to_rgb8, linear_to_gamma, ImageSink, OutputSink, PpmSink};
pub use primitive::{Intersection, Primitive, SurfaceSample};
pub use renderer::FrameScheduler;
pub use scene::{BuiltScene, LightSample, PrimitiveBox, Scene};
pub use sphere::Sphere;
pub use tile::{Tile, TileGrid};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec3};
