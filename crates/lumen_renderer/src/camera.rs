//! Camera for ray generation.

use lumen_math::{Ray, Vec3};
use rand::RngCore;

use crate::sampling::random_in_unit_disk;

/// Thin-lens camera mapping image-plane coordinates to primary rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,         // Vertical field of view in degrees
    aspect_ratio: f32, // Image width over height
    aperture: f32,     // Lens diameter, 0 for a pinhole
    focus_dist: f32,   // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 16.0 / 9.0,
            aperture: 0.0,
            focus_dist: 1.0,
            lower_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
        };
        camera.initialize();
        camera
    }

    /// Set the image aspect ratio (width / height).
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Recompute the cached viewport after changing settings.
    pub fn initialize(&mut self) {
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * self.aspect_ratio;

        // Calculate camera basis vectors
        let w = (self.look_at - self.look_from).normalize();
        self.u = w.cross(self.vup).normalize();
        self.v = self.u.cross(w);

        self.horizontal = self.u * viewport_width * self.focus_dist;
        self.vertical = self.v * viewport_height * self.focus_dist;
        self.lower_left =
            self.look_from - self.horizontal / 2.0 - self.vertical / 2.0 + self.focus_dist * w;
    }

    /// Generate the ray through image-plane point `(s, t)`.
    ///
    /// `s` runs left to right and `t` bottom to top, both over `[0, 1]`.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let origin = if self.aperture <= 0.0 {
            self.look_from
        } else {
            let rd = random_in_unit_disk(rng) * (self.aperture / 2.0);
            self.look_from + self.u * rd.x + self.v * rd.y
        };

        let target = self.lower_left + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
