//! Tile mosaicking: lay out the tiles covering a bounding box and paint them
//! onto one canvas.
//!
//! The canvas covers exactly the projected bounding box at the requested
//! zoom, multiplied by `scale`. Tiles whose columns fall outside the world
//! wrap around the antimeridian; rows outside the world are skipped and stay
//! transparent.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use projection::{SphericalMercator, TileRange};
use thumbnail_common::{BoundingBox, TileCoord};

use crate::error::RenderError;
use crate::format::{decode_rgba, encode_rgba, ImageFormat};

/// Largest canvas, in pixels, a mosaic will allocate (16384 x 16384).
pub const MAX_CANVAS_PIXELS: u64 = 16_384 * 16_384;

/// Where one fetched tile lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    /// Tile to fetch, with the column wrapped into the world.
    pub coord: TileCoord,
    /// Top-left corner on the canvas; may be negative.
    pub offset_x: i64,
    pub offset_y: i64,
}

/// Canvas size and tile positions for one stitched image.
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicLayout {
    zoom: u8,
    scale: f64,
    tile_size: u32,
    origin: (f64, f64),
    width: u64,
    height: u64,
    range: TileRange,
}

impl MosaicLayout {
    pub fn new(
        bbox: &BoundingBox,
        zoom: u8,
        scale: f64,
        tile_size: u32,
    ) -> Result<Self, RenderError> {
        if tile_size == 0 || !scale.is_finite() || scale <= 0.0 {
            return Err(RenderError::Canvas {
                width: tile_size,
                height: tile_size,
            });
        }

        let projection = SphericalMercator::new(tile_size);
        let (x_min, y_min, x_max, y_max) = projection.pixel_bounds(bbox, zoom);
        let width = ((x_max - x_min) * scale).round().max(1.0) as u64;
        let height = ((y_max - y_min) * scale).round().max(1.0) as u64;

        Ok(Self {
            zoom,
            scale,
            tile_size,
            origin: (x_min, y_min),
            width,
            height,
            range: projection.tile_range(bbox, zoom),
        })
    }

    pub fn width(&self) -> u64 {
        self.width
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn pixel_count(&self) -> u64 {
        self.width.saturating_mul(self.height)
    }

    /// Number of tiles that will be fetched.
    pub fn tile_count(&self) -> u64 {
        self.range.len()
    }

    /// Edge length of one tile on the canvas.
    pub fn scaled_tile_size(&self) -> u32 {
        (self.tile_size as f64 * self.scale).round().max(1.0) as u32
    }

    /// Every tile placement, row by row from the north-west corner.
    pub fn placements(&self) -> impl Iterator<Item = TilePlacement> + '_ {
        let matrix = 1i64 << self.zoom;
        let size = self.tile_size as f64;
        let range = self.range;

        (range.min_row..=range.max_row).flat_map(move |row| {
            (range.min_col..=range.max_col).map(move |col| TilePlacement {
                coord: TileCoord::new(self.zoom, col.rem_euclid(matrix) as u32, row as u32),
                offset_x: ((col as f64 * size - self.origin.0) * self.scale).round() as i64,
                offset_y: ((row as f64 * size - self.origin.1) * self.scale).round() as i64,
            })
        })
    }
}

/// An RGBA canvas tiles are painted onto.
pub struct Mosaic {
    canvas: RgbaImage,
    tile_px: u32,
}

impl Mosaic {
    /// Allocate a transparent canvas for `layout`.
    ///
    /// Layouts over [`MAX_CANVAS_PIXELS`] are rejected without allocating.
    pub fn new(layout: &MosaicLayout) -> Result<Self, RenderError> {
        if layout.pixel_count() > MAX_CANVAS_PIXELS {
            return Err(RenderError::CanvasTooLarge {
                width: layout.width,
                height: layout.height,
                max: MAX_CANVAS_PIXELS,
            });
        }
        let too_big = || RenderError::Canvas {
            width: layout.width.min(u32::MAX as u64) as u32,
            height: layout.height.min(u32::MAX as u64) as u32,
        };
        let width = u32::try_from(layout.width).map_err(|_| too_big())?;
        let height = u32::try_from(layout.height).map_err(|_| too_big())?;
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(too_big)?;

        Ok(Self {
            canvas: RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])),
            tile_px: layout.scaled_tile_size(),
        })
    }

    /// Decode a tile and paint it at its placement.
    pub fn place(&mut self, placement: &TilePlacement, tile: &[u8]) -> Result<(), RenderError> {
        let mut image = decode_rgba(tile)?;
        if image.dimensions() != (self.tile_px, self.tile_px) {
            image = imageops::resize(&image, self.tile_px, self.tile_px, FilterType::Triangle);
        }
        imageops::overlay(
            &mut self.canvas,
            &image,
            placement.offset_x,
            placement.offset_y,
        );
        Ok(())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        encode_rgba(&self.canvas, format)
    }
}
