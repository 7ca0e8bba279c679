//! Assembly of the parameter record handed to the stitcher.

use std::fmt;
use std::sync::Arc;

use renderer::ImageFormat;
use thumbnail_common::tile::MAX_ZOOM;
use thumbnail_common::{BoundingBox, ThumbnailError, ThumbnailResult};

use crate::composite::TileFetcher;
use crate::planner::ZoomPlan;

pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_FORMAT: ImageFormat = ImageFormat::Png;
pub const DEFAULT_FETCH_LIMIT: u64 = 36_000;
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Everything the stitcher needs for one image.
#[derive(Clone)]
pub struct RenderRequest {
    pub zoom: u8,
    pub bbox: BoundingBox,
    pub tile_size: u32,
    pub format: ImageFormat,
    pub fetch_limit: u64,
    pub scale: f64,
    pub source: Arc<dyn TileFetcher>,
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRequest")
            .field("zoom", &self.zoom)
            .field("bbox", &self.bbox)
            .field("tile_size", &self.tile_size)
            .field("format", &self.format)
            .field("fetch_limit", &self.fetch_limit)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

/// Merges a [`ZoomPlan`] with caller options.
///
/// Unset options take the defaults: scale 1, `png`, a 36000 tile fetch limit
/// and 256 px tiles. Values that are set but invalid fail [`build`].
///
/// [`build`]: RenderRequestBuilder::build
pub struct RenderRequestBuilder {
    source: Arc<dyn TileFetcher>,
    zoom: Option<i64>,
    bbox: Option<BoundingBox>,
    tile_size: Option<i64>,
    format: Option<ImageFormat>,
    fetch_limit: Option<i64>,
    scale: Option<f64>,
}

impl RenderRequestBuilder {
    pub fn new(source: Arc<dyn TileFetcher>) -> Self {
        Self {
            source,
            zoom: None,
            bbox: None,
            tile_size: None,
            format: None,
            fetch_limit: None,
            scale: None,
        }
    }

    /// Take zoom and bbox from a plan.
    pub fn plan(mut self, plan: &ZoomPlan) -> Self {
        self.zoom = Some(plan.zoom as i64);
        self.bbox = Some(plan.bbox);
        self
    }

    pub fn zoom(mut self, zoom: i64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn tile_size(mut self, tile_size: i64) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn fetch_limit(mut self, fetch_limit: i64) -> Self {
        self.fetch_limit = Some(fetch_limit);
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn build(self) -> ThumbnailResult<RenderRequest> {
        let zoom = self
            .zoom
            .ok_or_else(|| ThumbnailError::config("zoom", "no zoom was planned"))?;
        if !(0..=MAX_ZOOM as i64).contains(&zoom) {
            return Err(ThumbnailError::config(
                "zoom",
                format!("{} is outside 0..={}", zoom, MAX_ZOOM),
            ));
        }

        let bbox = self
            .bbox
            .ok_or_else(|| ThumbnailError::config("bbox", "no bbox was planned"))?;
        if !bbox.is_valid() || bbox.is_degenerate() {
            return Err(ThumbnailError::config(
                "bbox",
                format!("{:?} is not a valid, non-empty extent", bbox.to_array()),
            ));
        }

        let tile_size = match self.tile_size {
            None => DEFAULT_TILE_SIZE,
            Some(size) if size > 0 && size <= u32::MAX as i64 => size as u32,
            Some(size) => {
                return Err(ThumbnailError::config(
                    "tileSize",
                    format!("{} must be a positive pixel count", size),
                ))
            }
        };

        let fetch_limit = match self.fetch_limit {
            None => DEFAULT_FETCH_LIMIT,
            Some(limit) if limit > 0 => limit as u64,
            Some(limit) => {
                return Err(ThumbnailError::config(
                    "fetchLimit",
                    format!("{} must be positive", limit),
                ))
            }
        };

        let scale = self.scale.unwrap_or(DEFAULT_SCALE);
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ThumbnailError::config(
                "scale",
                format!("{} must be a positive number", scale),
            ));
        }

        Ok(RenderRequest {
            zoom: zoom as u8,
            bbox,
            tile_size,
            format: self.format.unwrap_or(DEFAULT_FORMAT),
            fetch_limit,
            scale,
            source: self.source,
        })
    }
}
