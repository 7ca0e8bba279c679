//! Error types for thumbnail rendering.
//!
//! Errors fall into two groups. [`InputError`] is a broken caller contract and
//! is raised before any asynchronous work starts. Everything else is a runtime
//! failure of one pipeline stage and is delivered through the terminal result.

use thiserror::Error;

use crate::tile::TileCoord;

/// Result type alias using ThumbnailError.
pub type ThumbnailResult<T> = Result<T, ThumbnailError>;

/// Caller contract violations, detected synchronously.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Cannot render thumbnail without GeoJSON passed")]
    MissingGeometry,

    #[error("Malformed GeoJSON: {0}")]
    MalformedGeometry(String),

    #[error("GeoJSON contains no coordinates")]
    EmptyGeometry,

    #[error("Options need to be an object, got {0}")]
    OptionsNotObject(String),

    #[error("Malformed options: {0}")]
    MalformedOptions(String),
}

/// Failures to initialize or fetch from a background or overlay source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("Invalid source descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Failed to load source metadata from {url}: {message}")]
    Metadata { url: String, message: String },

    #[error("Zoom level {zoom} outside source range {min}..={max}")]
    ZoomOutOfRange { zoom: u8, min: u8, max: u8 },

    #[error("Failed to fetch tile {coord}: {message}")]
    Fetch { coord: TileCoord, message: String },

    #[error("Overlay rendering failed for tile {coord}: {message}")]
    Overlay { coord: TileCoord, message: String },

    #[error("Invalid overlay input: {0}")]
    InvalidOverlay(String),
}

/// Primary error type for a thumbnail render.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Invalid option value for '{option}': {message}")]
    Config { option: String, message: String },

    #[error("Stylesheet error: {0}")]
    Stylesheet(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Compositing failed: {0}")]
    Compositing(String),

    #[error("Stitching failed: {0}")]
    Stitching(String),
}

impl ThumbnailError {
    /// Create a Config error.
    pub fn config(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            option: option.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable category for logs and CLI exit reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            ThumbnailError::Input(_) => "InputError",
            ThumbnailError::Config { .. } => "ConfigError",
            ThumbnailError::Stylesheet(_) => "StylesheetError",
            ThumbnailError::Source(_) => "SourceError",
            ThumbnailError::Compositing(_) => "CompositingError",
            ThumbnailError::Stitching(_) => "StitchingError",
        }
    }
}

impl From<serde_json::Error> for InputError {
    fn from(err: serde_json::Error) -> Self {
        InputError::MalformedGeometry(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(
            ThumbnailError::from(InputError::MissingGeometry).kind(),
            "InputError"
        );
        assert_eq!(
            ThumbnailError::config("tile_size", "must be positive").kind(),
            "ConfigError"
        );
        let err = ThumbnailError::from(SourceError::InvalidDescriptor("no tiles".into()));
        assert_eq!(err.kind(), "SourceError");
        assert_eq!(err.to_string(), "Invalid source descriptor: no tiles");
    }
}
