//! Error types for the renderer crate.

use thiserror::Error;

/// Errors that can occur while rasterizing, blending or encoding tiles.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Image encoding failed: {0}")]
    Encode(String),

    #[error("Failed to decode tile: {0}")]
    Decode(String),

    #[error("Tile dimensions differ: background {background:?}, overlay {overlay:?}")]
    DimensionMismatch {
        background: (u32, u32),
        overlay: (u32, u32),
    },

    #[error("Invalid stylesheet: {0}")]
    Style(String),

    #[error("Cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("Canvas of {width}x{height} px exceeds the {max} pixel limit")]
    CanvasTooLarge { width: u64, height: u64, max: u64 },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Decode(err.to_string())
    }
}
