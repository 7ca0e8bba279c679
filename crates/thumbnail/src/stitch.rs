//! Stitching: fetch every tile a request covers and assemble one image.

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use renderer::{Mosaic, MosaicLayout};
use thumbnail_common::{ThumbnailError, ThumbnailResult};
use tracing::{debug, info, instrument};

use crate::request::RenderRequest;

/// Response headers describing a stitched image.
pub type Headers = BTreeMap<String, String>;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const TILE_COUNT: &str = "X-Tile-Count";

/// Encoded output of a stitch.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchedImage {
    pub image: Bytes,
    pub headers: Headers,
}

/// Assembles the final image from a request's tile source.
#[async_trait]
pub trait Stitcher: Send + Sync {
    async fn assemble(&self, request: RenderRequest) -> ThumbnailResult<StitchedImage>;
}

/// Fetches tiles with bounded concurrency and paints them onto a mosaic.
///
/// Any failed tile fetch aborts the stitch with that tile's error.
#[derive(Debug, Clone, Copy)]
pub struct MosaicStitcher {
    concurrency: usize,
}

impl Default for MosaicStitcher {
    fn default() -> Self {
        Self { concurrency: 16 }
    }
}

impl MosaicStitcher {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }
}

#[async_trait]
impl Stitcher for MosaicStitcher {
    #[instrument(skip(self, request), fields(zoom = request.zoom, format = %request.format))]
    async fn assemble(&self, request: RenderRequest) -> ThumbnailResult<StitchedImage> {
        let start = Instant::now();
        let layout =
            MosaicLayout::new(&request.bbox, request.zoom, request.scale, request.tile_size)
                .map_err(|e| ThumbnailError::Stitching(e.to_string()))?;

        let tile_count = layout.tile_count();
        if tile_count > request.fetch_limit {
            return Err(ThumbnailError::Stitching(format!(
                "{} tiles needed, fetch limit is {}",
                tile_count, request.fetch_limit
            )));
        }

        let mut mosaic =
            Mosaic::new(&layout).map_err(|e| ThumbnailError::Stitching(e.to_string()))?;
        debug!(
            tiles = tile_count,
            width = layout.width(),
            height = layout.height(),
            "Stitching mosaic"
        );

        let source = request.source.clone();
        let mut tiles = stream::iter(layout.placements())
            .map(|placement| {
                let source = source.clone();
                async move {
                    let tile = source.fetch_tile(placement.coord).await?;
                    Ok::<_, ThumbnailError>((placement, tile))
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((placement, tile)) = tiles.try_next().await? {
            mosaic.place(&placement, &tile).map_err(|e| {
                ThumbnailError::Stitching(format!("tile {}: {}", placement.coord, e))
            })?;
        }

        let format = request.format;
        let image = tokio::task::spawn_blocking(move || mosaic.encode(format))
            .await
            .map_err(|e| ThumbnailError::Stitching(format!("encode task failed: {}", e)))?
            .map_err(|e| ThumbnailError::Stitching(e.to_string()))?;

        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE.to_string(), format.mime_type().to_string());
        headers.insert(TILE_COUNT.to_string(), tile_count.to_string());

        info!(
            tiles = tile_count,
            bytes = image.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Stitched thumbnail"
        );

        Ok(StitchedImage {
            image: Bytes::from(image),
            headers,
        })
    }
}
