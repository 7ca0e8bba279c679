//! Background tile sources.
//!
//! A background is described by a [`BackgroundDescriptor`] and turned into a
//! live [`BackgroundSource`] by a [`BackgroundLoader`]. The HTTP
//! implementations live in [`http`].

pub mod http;
pub mod preset;
pub mod tilejson;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thumbnail_common::{SourceError, TileCoord, ZoomRange};

pub use http::{HttpBackgroundLoader, HttpTileSource};
pub use preset::BackgroundPreset;
pub use tilejson::{TileJson, TileScheme};

/// Where background tiles come from.
///
/// In JSON: `{"preset": "natural-earth"}`, a TileJSON URL string, or an
/// embedded TileJSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackgroundDescriptor {
    Preset {
        preset: BackgroundPreset,
    },
    /// URL of a TileJSON document.
    Url(String),
    /// Embedded TileJSON, validated when the source is loaded.
    TileJson(serde_json::Value),
}

impl BackgroundDescriptor {
    pub fn preset(preset: BackgroundPreset) -> Self {
        BackgroundDescriptor::Preset { preset }
    }

    /// Embed a TileJSON document.
    pub fn tilejson(tilejson: &TileJson) -> Result<Self, SourceError> {
        serde_json::to_value(tilejson)
            .map(BackgroundDescriptor::TileJson)
            .map_err(|e| SourceError::InvalidDescriptor(format!("TileJSON: {}", e)))
    }
}

impl From<BackgroundPreset> for BackgroundDescriptor {
    fn from(preset: BackgroundPreset) -> Self {
        BackgroundDescriptor::preset(preset)
    }
}

/// A raster basemap that serves tiles by coordinate.
#[async_trait]
pub trait BackgroundSource: Send + Sync {
    /// Zooms this source can serve.
    fn zoom_range(&self) -> ZoomRange;

    /// Edge length of served tiles in pixels.
    fn tile_size(&self) -> u32;

    /// Fetch one encoded tile.
    async fn fetch_tile(&self, coord: TileCoord) -> Result<Bytes, SourceError>;
}

/// Initializes background sources from descriptors.
#[async_trait]
pub trait BackgroundLoader: Send + Sync {
    async fn load(
        &self,
        descriptor: &BackgroundDescriptor,
    ) -> Result<Arc<dyn BackgroundSource>, SourceError>;
}
