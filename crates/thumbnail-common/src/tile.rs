//! Tile addressing and zoom ranges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest zoom level any source or plan may use.
pub const MAX_ZOOM: u8 = 30;

/// A tile coordinate (z/x/y) in the XYZ scheme (row 0 at the north edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u8,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this zoom.
    pub fn matrix_size(&self) -> u64 {
        1u64 << self.z
    }

    /// Row index in the TMS scheme (row 0 at the south edge).
    pub fn tms_y(&self) -> u32 {
        (self.matrix_size() - 1 - self.y as u64) as u32
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// An inclusive range of zoom levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    /// Create a range, returning `None` unless `min <= max <= MAX_ZOOM`.
    pub fn new(min: u8, max: u8) -> Option<Self> {
        (min <= max && max <= MAX_ZOOM).then_some(Self { min, max })
    }

    pub fn contains(&self, zoom: u8) -> bool {
        zoom >= self.min && zoom <= self.max
    }

    /// Clamp a zoom into this range.
    pub fn clamp(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min, self.max)
    }

    /// Overlap of two ranges, if any.
    pub fn intersect(&self, other: &ZoomRange) -> Option<ZoomRange> {
        ZoomRange::new(self.min.max(other.min), self.max.min(other.max))
    }
}

impl fmt::Display for ZoomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}
