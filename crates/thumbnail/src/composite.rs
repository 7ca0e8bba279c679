//! Layered tile source: background with the geometry overlay blended on top.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use renderer::ImageFormat;
use serde::{Deserialize, Serialize};
use thumbnail_common::{ThumbnailResult, TileCoord};
use tracing::{instrument, trace};

use crate::blend::Blender;
use crate::overlay::OverlaySource;
use crate::sources::BackgroundSource;

/// Anything the stitcher can pull tiles from.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch_tile(&self, coord: TileCoord) -> ThumbnailResult<Bytes>;
}

/// Counters updated concurrently by tile fetches.
#[derive(Debug, Default)]
pub struct Stats {
    tiles: AtomicU64,
    blended: AtomicU64,
    background_only: AtomicU64,
    failed: AtomicU64,
    fetch_micros: AtomicU64,
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeStats {
    /// Every composite fetch, successful or not.
    pub tiles: u64,
    /// Fetches that blended an overlay onto the background.
    pub blended: u64,
    /// Fetches that passed the background through untouched.
    pub background_only: u64,
    pub failed: u64,
    /// Summed wall time of all fetches.
    pub fetch_micros: u64,
}

impl Stats {
    pub fn snapshot(&self) -> CompositeStats {
        CompositeStats {
            tiles: self.tiles.load(Ordering::Relaxed),
            blended: self.blended.load(Ordering::Relaxed),
            background_only: self.background_only.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            fetch_micros: self.fetch_micros.load(Ordering::Relaxed),
        }
    }
}

/// Fans each fetch out to the background and the overlay, then blends.
pub struct CompositeSource {
    background: Arc<dyn BackgroundSource>,
    overlay: Arc<dyn OverlaySource>,
    blender: Arc<dyn Blender>,
    format: ImageFormat,
    stats: Stats,
}

impl CompositeSource {
    pub fn new(
        background: Arc<dyn BackgroundSource>,
        overlay: Arc<dyn OverlaySource>,
        blender: Arc<dyn Blender>,
        format: ImageFormat,
    ) -> Self {
        Self {
            background,
            overlay,
            blender,
            format,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> CompositeStats {
        self.stats.snapshot()
    }

    async fn compose(&self, coord: TileCoord) -> ThumbnailResult<Bytes> {
        let (background, overlay) = tokio::join!(
            self.background.fetch_tile(coord),
            self.overlay.fetch_tile(coord)
        );
        let background = background?;

        match overlay? {
            None => {
                trace!(tile = %coord, "No overlay content, passing background through");
                self.stats.background_only.fetch_add(1, Ordering::Relaxed);
                Ok(background)
            }
            Some(overlay) => {
                let blended = self.blender.blend(background, overlay, self.format).await?;
                self.stats.blended.fetch_add(1, Ordering::Relaxed);
                Ok(blended)
            }
        }
    }
}

#[async_trait]
impl TileFetcher for CompositeSource {
    #[instrument(level = "debug", skip(self), fields(tile = %coord))]
    async fn fetch_tile(&self, coord: TileCoord) -> ThumbnailResult<Bytes> {
        self.stats.tiles.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let result = self.compose(coord).await;

        self.stats
            .fetch_micros
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        if result.is_err() {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}
