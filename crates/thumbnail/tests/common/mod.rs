//! Mock collaborators for thumbnail pipeline tests.
//!
//! None of these touch the network: backgrounds serve one synthetic tile,
//! overlays answer with a fixed decision, and every mock counts its calls.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thumbnail::{
    BackgroundDescriptor, BackgroundLoader, BackgroundSource, Blender, Geometry, ImageBlender,
    ImageFormat, ImageOptions, OverlayFactory, OverlaySource, SourceError, Stylesheet,
    ThumbnailResult, TileCoord, ZoomRange,
};

pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const RED: [u8; 4] = [255, 0, 0, 255];

/// Background that serves the same solid tile for every coordinate.
pub struct SolidBackground {
    tile: Bytes,
    tile_size: u32,
    zooms: ZoomRange,
    fail_with: Option<SourceError>,
    pub fetches: AtomicU64,
}

impl SolidBackground {
    pub fn new(tile_size: u32, zooms: ZoomRange) -> Self {
        Self {
            tile: Bytes::from(test_utils::solid_tile(tile_size, BLUE)),
            tile_size,
            zooms,
            fail_with: None,
            fetches: AtomicU64::new(0),
        }
    }

    /// Every fetch fails with `error`.
    pub fn failing(mut self, error: SourceError) -> Self {
        self.fail_with = Some(error);
        self
    }

    pub fn tile(&self) -> Bytes {
        self.tile.clone()
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackgroundSource for SolidBackground {
    fn zoom_range(&self) -> ZoomRange {
        self.zooms
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    async fn fetch_tile(&self, _coord: TileCoord) -> Result<Bytes, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(self.tile.clone()),
        }
    }
}

/// Loader that hands out one prepared background, or fails.
pub struct StaticLoader {
    background: Arc<SolidBackground>,
    fail_with: Option<SourceError>,
    pub loads: AtomicU64,
}

impl StaticLoader {
    pub fn new(background: Arc<SolidBackground>) -> Self {
        Self {
            background,
            fail_with: None,
            loads: AtomicU64::new(0),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            background: Arc::new(SolidBackground::new(256, full_range())),
            fail_with: Some(error),
            loads: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl BackgroundLoader for StaticLoader {
    async fn load(
        &self,
        _descriptor: &BackgroundDescriptor,
    ) -> Result<Arc<dyn BackgroundSource>, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(self.background.clone()),
        }
    }
}

/// Overlay whose answer does not depend on the tile.
pub struct FixedOverlay {
    tile: Option<Bytes>,
}

impl FixedOverlay {
    /// Never has content.
    pub fn empty() -> Self {
        Self { tile: None }
    }

    /// Always returns a solid red tile.
    pub fn solid(tile_size: u32) -> Self {
        Self {
            tile: Some(Bytes::from(test_utils::solid_tile(tile_size, RED))),
        }
    }
}

#[async_trait]
impl OverlaySource for FixedOverlay {
    async fn fetch_tile(&self, _coord: TileCoord) -> Result<Option<Bytes>, SourceError> {
        Ok(self.tile.clone())
    }
}

/// Overlay that always fails to render.
pub struct BrokenOverlay;

#[async_trait]
impl OverlaySource for BrokenOverlay {
    async fn fetch_tile(&self, coord: TileCoord) -> Result<Option<Bytes>, SourceError> {
        Err(SourceError::Overlay {
            coord,
            message: "rasterizer exploded".to_string(),
        })
    }
}

/// Factory handing out one prepared overlay for every render.
pub struct FixedOverlayFactory(pub Arc<dyn OverlaySource>);

impl OverlayFactory for FixedOverlayFactory {
    fn build(
        &self,
        _geometry: Arc<Geometry>,
        _stylesheet: &Stylesheet,
        _options: &ImageOptions,
    ) -> Result<Arc<dyn OverlaySource>, SourceError> {
        Ok(self.0.clone())
    }
}

/// [`ImageBlender`] that counts its calls.
#[derive(Default)]
pub struct CountingBlender {
    inner: ImageBlender,
    pub calls: AtomicU64,
}

impl CountingBlender {
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Blender for CountingBlender {
    async fn blend(
        &self,
        background: Bytes,
        overlay: Bytes,
        format: ImageFormat,
    ) -> ThumbnailResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.blend(background, overlay, format).await
    }
}

pub fn full_range() -> ZoomRange {
    ZoomRange::new(0, 22).expect("0..=22 is a valid range")
}

pub fn range(min: u8, max: u8) -> ZoomRange {
    ZoomRange::new(min, max).expect("test ranges are ordered")
}
