//! Geometry-driven zoom suggestion.

use projection::SphericalMercator;
use thumbnail_common::BoundingBox;

/// Highest zoom [`decide_zoom`] will suggest.
pub const MAX_SUGGESTED_ZOOM: u8 = 18;

/// Largest pixel edge (at 256 px tiles) the extent may occupy at the suggested zoom.
pub const TARGET_EXTENT_PX: f64 = 512.0;

/// Suggest a zoom for an extent: the deepest zoom in `0..=18` at which the
/// extent's longer pixel edge still fits within [`TARGET_EXTENT_PX`].
///
/// Larger extents give lower zooms. A zero-size extent gets
/// [`MAX_SUGGESTED_ZOOM`].
pub fn decide_zoom(bbox: &BoundingBox) -> u8 {
    let projection = SphericalMercator::default();
    (0..=MAX_SUGGESTED_ZOOM)
        .rev()
        .find(|&zoom| {
            let (x_min, y_min, x_max, y_max) = projection.pixel_bounds(bbox, zoom);
            (x_max - x_min).max(y_max - y_min) <= TARGET_EXTENT_PX
        })
        .unwrap_or(0)
}
