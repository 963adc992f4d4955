//! Error types for scene construction, configuration and output.

use thiserror::Error;

/// Errors that can occur while building a scene or producing an image.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot build a BVH over an empty primitive collection")]
    EmptyScene,

    #[error("Triangle mesh has no triangles")]
    EmptyMesh,

    #[error("Triangle index {index} is out of range for {vertex_count} vertices")]
    InvalidMeshIndex { index: u32, vertex_count: usize },

    #[error("Light sampling requested but the scene has no emissive surface area")]
    NoEmissiveSurfaces,

    #[error("Output sink error: {0}")]
    Output(String),

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
