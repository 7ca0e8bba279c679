//! Overlay tile sources built from the input geometry.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use renderer::{MapOptions, OverlayRenderer, Stylesheet};
use thumbnail_common::{Geometry, SourceError, TileCoord};
use tracing::instrument;

/// Image parameters shared by every overlay tile.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub tile_size: u32,
    /// Passed through untouched from the caller's `mapOptions`.
    pub map_options: serde_json::Value,
}

/// Serves the rendered geometry as tiles.
#[async_trait]
pub trait OverlaySource: Send + Sync {
    /// `Ok(None)` means the geometry does not reach this tile.
    async fn fetch_tile(&self, coord: TileCoord) -> Result<Option<Bytes>, SourceError>;
}

/// Builds an overlay source for one render.
pub trait OverlayFactory: Send + Sync {
    fn build(
        &self,
        geometry: Arc<Geometry>,
        stylesheet: &Stylesheet,
        options: &ImageOptions,
    ) -> Result<Arc<dyn OverlaySource>, SourceError>;
}

/// Rasterizes the geometry per tile with [`OverlayRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterOverlayFactory;

impl OverlayFactory for RasterOverlayFactory {
    fn build(
        &self,
        geometry: Arc<Geometry>,
        stylesheet: &Stylesheet,
        options: &ImageOptions,
    ) -> Result<Arc<dyn OverlaySource>, SourceError> {
        let map_options = MapOptions::from_value(&options.map_options)
            .map_err(|e| SourceError::InvalidOverlay(format!("mapOptions: {}", e)))?;
        let renderer = OverlayRenderer::new(geometry, stylesheet, options.tile_size, map_options)
            .map_err(|e| SourceError::InvalidOverlay(e.to_string()))?;

        Ok(Arc::new(RasterOverlaySource {
            renderer: Arc::new(renderer),
        }))
    }
}

/// Overlay source backed by an [`OverlayRenderer`].
pub struct RasterOverlaySource {
    renderer: Arc<OverlayRenderer>,
}

#[async_trait]
impl OverlaySource for RasterOverlaySource {
    #[instrument(level = "trace", skip(self), fields(tile = %coord))]
    async fn fetch_tile(&self, coord: TileCoord) -> Result<Option<Bytes>, SourceError> {
        if !self.renderer.covers(&coord) {
            return Ok(None);
        }

        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || renderer.render_tile(&coord))
            .await
            .map_err(|e| SourceError::Overlay {
                coord,
                message: format!("render task failed: {}", e),
            })?;

        rendered.map(|tile| tile.map(Bytes::from)).map_err(|e| SourceError::Overlay {
            coord,
            message: e.to_string(),
        })
    }
}
