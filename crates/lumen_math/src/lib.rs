//! Lumen math - rays, parametric intervals and axis-aligned boxes.
//!
//! Vector arithmetic comes straight from glam and is re-exported here so the
//! renderer only ever depends on one math crate.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
