//! Spherical (Web) Mercator projection in tile-pixel space.
//!
//! Pixel space at zoom `z` is a square of `tile_size * 2^z` pixels with the
//! origin at the north-west corner of the world (lon -180, lat ~85.05).
//! Conversions are unrounded so that `ll(px(p))` returns `p` up to float
//! precision.

use std::f64::consts::PI;

use thumbnail_common::{BoundingBox, TileCoord};

/// Latitude is clamped so that `sin(lat)` stays inside this bound; beyond it
/// the Mercator y coordinate diverges.
const MAX_SIN_LAT: f64 = 0.9999;

/// Inclusive block of tile columns and rows at one zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_col: i64,
    pub max_col: i64,
    pub min_row: i64,
    pub max_row: i64,
}

impl TileRange {
    pub fn columns(&self) -> u64 {
        (self.max_col - self.min_col + 1).max(0) as u64
    }

    pub fn rows(&self) -> u64 {
        (self.max_row - self.min_row + 1).max(0) as u64
    }

    /// Total number of tiles in the block.
    pub fn len(&self) -> u64 {
        self.columns() * self.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spherical Mercator conversions for one tile size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalMercator {
    tile_size: u32,
}

impl Default for SphericalMercator {
    fn default() -> Self {
        Self { tile_size: 256 }
    }
}

impl SphericalMercator {
    /// Create a projection for square tiles of `tile_size` pixels.
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Width (and height) of the whole world in pixels at `zoom`.
    pub fn world_size(&self, zoom: u8) -> f64 {
        self.tile_size as f64 * 2f64.powi(zoom as i32)
    }

    /// Geographic `(lon, lat)` to pixel `(x, y)` at `zoom`.
    pub fn px(&self, lon: f64, lat: f64, zoom: u8) -> (f64, f64) {
        let world = self.world_size(zoom);
        let center = world / 2.0;
        let f = lat.to_radians().sin().clamp(-MAX_SIN_LAT, MAX_SIN_LAT);

        let x = center + lon * world / 360.0;
        let y = center - 0.5 * ((1.0 + f) / (1.0 - f)).ln() * world / (2.0 * PI);
        (x, y)
    }

    /// Pixel `(x, y)` at `zoom` to geographic `(lon, lat)`.
    pub fn ll(&self, x: f64, y: f64, zoom: u8) -> (f64, f64) {
        let world = self.world_size(zoom);
        let center = world / 2.0;

        let lon = (x - center) * 360.0 / world;
        let g = (center - y) * 2.0 * PI / world;
        let lat = (2.0 * g.exp().atan() - 0.5 * PI).to_degrees();
        (lon, lat)
    }

    /// Pixel extent `(x_min, y_min, x_max, y_max)` of a geographic box.
    ///
    /// The y axis points south, so `y_min` comes from the north edge.
    pub fn pixel_bounds(&self, bbox: &BoundingBox, zoom: u8) -> (f64, f64, f64, f64) {
        let (x_min, y_min) = self.px(bbox.min_x, bbox.max_y, zoom);
        let (x_max, y_max) = self.px(bbox.max_x, bbox.min_y, zoom);
        (x_min, y_min, x_max, y_max)
    }

    /// Geographic bounds of a tile.
    pub fn tile_bounds(&self, coord: &TileCoord) -> BoundingBox {
        let size = self.tile_size as f64;
        let (west, north) = self.ll(coord.x as f64 * size, coord.y as f64 * size, coord.z);
        let (east, south) = self.ll(
            (coord.x as f64 + 1.0) * size,
            (coord.y as f64 + 1.0) * size,
            coord.z,
        );
        BoundingBox::new(west, south, east, north)
    }

    /// Columns and rows of the tiles covering `bbox` at `zoom`.
    ///
    /// Columns are not wrapped, so a box crossing the antimeridian yields
    /// indices outside `0..2^zoom`. Rows are clamped to the world.
    pub fn tile_range(&self, bbox: &BoundingBox, zoom: u8) -> TileRange {
        let (x_min, y_min, x_max, y_max) = self.pixel_bounds(bbox, zoom);
        let size = self.tile_size as f64;
        let last_row = ((1u64 << zoom) - 1) as i64;
        // A bbox edge landing exactly on a tile boundary does not pull in the next tile.
        let last_index = |v: f64| (v / size).ceil() as i64 - 1;

        let min_col = (x_min / size).floor() as i64;
        let min_row = ((y_min / size).floor() as i64).clamp(0, last_row);
        TileRange {
            min_col,
            max_col: last_index(x_max).max(min_col),
            min_row,
            max_row: last_index(y_max).clamp(min_row, last_row),
        }
    }

    /// Tile containing a geographic point (clamped to the world).
    pub fn tile_for(&self, lon: f64, lat: f64, zoom: u8) -> TileCoord {
        let (x, y) = self.px(lon, lat, zoom);
        let max_index = (1u64 << zoom) - 1;
        let to_index = |v: f64| {
            let index = (v / self.tile_size as f64).floor();
            index.clamp(0.0, max_index as f64) as u32
        };
        TileCoord::new(zoom, to_index(x), to_index(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_world_center() {
        let sm = SphericalMercator::default();
        let (x, y) = sm.px(0.0, 0.0, 0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_is_linear() {
        let sm = SphericalMercator::default();
        let (lon_a, _) = sm.ll(0.0, 0.0, 3);
        let (lon_b, _) = sm.ll(10.0, 10.0, 3);
        // 10 px at zoom 3 with 256px tiles = 10 * 360 / 2048 degrees
        assert!(((lon_b - lon_a) - 10.0 * 360.0 / 2048.0).abs() < 1e-12);
    }

    #[test]
    fn test_tile_for_clamps() {
        let sm = SphericalMercator::default();
        assert_eq!(sm.tile_for(180.0, -89.0, 2), TileCoord::new(2, 3, 3));
        assert_eq!(sm.tile_for(-180.0, 89.0, 2), TileCoord::new(2, 0, 0));
    }

    #[test]
    fn test_tile_range_world() {
        let sm = SphericalMercator::default();
        let world = BoundingBox::new(-180.0, -85.0511287798, 180.0, 85.0511287798);
        let range = sm.tile_range(&world, 1);
        assert_eq!((range.min_col, range.max_col), (0, 1));
        assert_eq!((range.min_row, range.max_row), (0, 1));
        assert_eq!(range.len(), 4);
    }
}
