//! Zoom and extent planning.
//!
//! Picks the zoom a thumbnail is rendered at and pads the geometry's extent
//! so the rendered area is never smaller than a minimum pixel footprint.
//!
//! The padding constants below were tuned by eye against typical basemaps.
//! They are not derived from anything and may need adjusting per deployment.

use projection::SphericalMercator;
use thumbnail_common::{BoundingBox, ThumbnailError, ThumbnailResult, ZoomRange};
use tracing::debug;

use crate::zoom::decide_zoom;

/// Minimum rendered width and height in pixels.
pub const MIN_FOOTPRINT_PX: f64 = 200.0;

/// Pixel offset converted to degrees to get the baseline padding.
pub const PROBE_OFFSET_PX: f64 = 10.0;

/// Padding as a fraction of the extent's own width and height.
pub const RELATIVE_PAD: f64 = 0.05;

/// Padding never drops below this many degrees.
pub const MIN_PAD_DEGREES: f64 = 0.001;

/// Planned zoom and padded extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPlan {
    pub zoom: u8,
    pub bbox: BoundingBox,
}

/// The four candidates the padding is the maximum of, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddingTerms {
    pub relative_width: f64,
    pub relative_height: f64,
    pub footprint: f64,
    pub floor: f64,
}

impl PaddingTerms {
    pub fn pad(&self) -> f64 {
        self.relative_width
            .max(self.relative_height)
            .max(self.footprint)
            .max(self.floor)
    }
}

/// Computes [`ZoomPlan`]s. All pixel↔degree conversions go through its projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoomExtentPlanner {
    projection: SphericalMercator,
}

impl ZoomExtentPlanner {
    pub fn new(projection: SphericalMercator) -> Self {
        Self { projection }
    }

    /// Plan zoom and padded extent for `extent`.
    ///
    /// The suggested zoom is clamped to the background's range, then to the
    /// caller's. The two ranges must overlap.
    pub fn plan(
        &self,
        extent: &BoundingBox,
        background: ZoomRange,
        caller: ZoomRange,
    ) -> ThumbnailResult<ZoomPlan> {
        if !extent.is_valid() {
            return Err(ThumbnailError::config(
                "bbox",
                format!("invalid geometry extent {:?}", extent.to_array()),
            ));
        }
        let allowed = background.intersect(&caller).ok_or_else(|| {
            ThumbnailError::config(
                "thumbnailMinZoom/thumbnailMaxZoom",
                format!(
                    "zoom range {} does not overlap the background's {}",
                    caller, background
                ),
            )
        })?;

        let suggested = decide_zoom(extent);
        let zoom = caller.clamp(background.clamp(suggested));
        debug_assert!(allowed.contains(zoom));

        let terms = self.padding_terms(extent, zoom);
        let pad = terms.pad();
        let bbox = extent.pad(pad);

        debug!(
            suggested,
            zoom,
            pad,
            bbox = ?bbox.to_array(),
            "Planned thumbnail extent"
        );

        Ok(ZoomPlan { zoom, bbox })
    }

    /// Padding candidates for `extent` rendered at `zoom`.
    pub fn padding_terms(&self, extent: &BoundingBox, zoom: u8) -> PaddingTerms {
        let (x_min, y_min, x_max, y_max) = self.projection.pixel_bounds(extent, zoom);
        let width_px = x_max - x_min;
        let height_px = y_max - y_min;

        // Whichever axis falls furthest short of the footprint drives the pad.
        let shortfall = (MIN_FOOTPRINT_PX - width_px).max(MIN_FOOTPRINT_PX - height_px);
        let footprint = if shortfall > 0.0 {
            self.pixels_to_degrees(shortfall, zoom)
        } else {
            self.pixels_to_degrees(PROBE_OFFSET_PX, zoom)
        };

        PaddingTerms {
            relative_width: extent.width().abs() * RELATIVE_PAD,
            relative_height: extent.height().abs() * RELATIVE_PAD,
            footprint,
            floor: MIN_PAD_DEGREES,
        }
    }

    /// Longitude span of `pixels` at `zoom`, measured from the pixel origin.
    fn pixels_to_degrees(&self, pixels: f64, zoom: u8) -> f64 {
        let (origin_lon, _) = self.projection.ll(0.0, 0.0, zoom);
        let (probe_lon, _) = self.projection.ll(pixels, PROBE_OFFSET_PX, zoom);
        (probe_lon - origin_lon).abs()
    }
}
