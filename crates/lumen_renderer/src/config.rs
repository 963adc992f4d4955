//! Render configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Color, RenderError, RenderResult};

/// Render configuration.
///
/// Every field has a default, so a JSON file only needs to name the values
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Independent samples traced per pixel
    pub samples_per_pixel: u32,
    /// Number of tile columns
    pub tiles_x: u32,
    /// Number of tile rows
    pub tiles_y: u32,
    /// Hard ceiling on path length; Russian roulette normally ends paths first
    pub max_depth: u32,
    /// Russian roulette continuation probability, in (0, 1)
    pub continuation_probability: f32,
    /// Radiance returned for rays that escape the scene
    pub background: [f32; 3],
    /// Replace `background` with a white-to-blue vertical sky
    pub sky_gradient: bool,
    /// Base seed mixed into every per-pixel random stream
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 225,
            samples_per_pixel: 16,
            tiles_x: 4,
            tiles_y: 4,
            max_depth: 64,
            continuation_probability: 0.8,
            background: [0.0; 3],
            sky_gradient: false,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        log::info!("Loading render config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn background_color(&self) -> Color {
        Color::from(self.background)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Check that the configuration describes a renderable frame.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("image size {}x{} is empty", self.width, self.height));
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1".into());
        }
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return invalid(format!("tile grid {}x{} is empty", self.tiles_x, self.tiles_y));
        }
        if self.tiles_x > self.width || self.tiles_y > self.height {
            return invalid(format!(
                "tile grid {}x{} exceeds image size {}x{}",
                self.tiles_x, self.tiles_y, self.width, self.height
            ));
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1".into());
        }
        let p = self.continuation_probability;
        if !(p > 0.0 && p < 1.0) {
            return invalid(format!("continuation_probability {p} is outside (0, 1)"));
        }
        if self.background.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return invalid("background must be finite and non-negative".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RenderConfig::from_json_str(r#"{ "width": 64, "height": 32, "seed": 7 }"#)
            .unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 32);
        assert_eq!(config.seed, 7);
        assert_eq!(config.samples_per_pixel, RenderConfig::default().samples_per_pixel);
        assert_eq!(config.continuation_probability, 0.8);
        assert!(!config.sky_gradient);
    }

    #[test]
    fn test_sky_gradient_from_json() {
        let config = RenderConfig::from_json_str(r#"{ "sky_gradient": true }"#).unwrap();
        assert!(config.sky_gradient);
        assert_eq!(config.background, [0.0; 3]);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            RenderConfig {
                width: 0,
                ..Default::default()
            },
            RenderConfig {
                samples_per_pixel: 0,
                ..Default::default()
            },
            RenderConfig {
                tiles_y: 0,
                ..Default::default()
            },
            RenderConfig {
                width: 2,
                tiles_x: 3,
                ..Default::default()
            },
            RenderConfig {
                max_depth: 0,
                ..Default::default()
            },
            RenderConfig {
                continuation_probability: 1.0,
                ..Default::default()
            },
            RenderConfig {
                continuation_probability: 0.0,
                ..Default::default()
            },
            RenderConfig {
                background: [f32::NAN, 0.0, 0.0],
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(
                matches!(config.validate(), Err(RenderError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = RenderConfig::from_json_str("{ width: }").unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }

    #[test]
    fn test_json_validation_runs() {
        let err = RenderConfig::from_json_str(r#"{ "tiles_x": 0 }"#).unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
    }
}
