//! Rasterize an input geometry into individual map tiles.
//!
//! Each tile is drawn independently in Web Mercator pixel space with
//! tiny-skia: polygons get an even-odd fill plus an outline, lines get an
//! outline only, and points become filled circles. A tile the geometry does
//! not reach yields `None` so the caller can pass the background through.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint as SkPaint, PathBuilder, Pixmap, Stroke, Transform,
};
use tracing::trace;

use projection::SphericalMercator;
use thumbnail_common::geometry::{Position, Shape};
use thumbnail_common::{BoundingBox, Geometry, TileCoord};

use crate::error::RenderError;
use crate::png;
use crate::style::{Paint, Rgba, Stylesheet};

/// Caller-supplied rasterizer switches carried in `map_options`.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Anti-alias edges.
    pub antialias: bool,
    /// Extra pixels around the geometry when deciding whether a tile is covered.
    pub buffer: f32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            buffer: 0.0,
        }
    }
}

impl MapOptions {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value)
    }
}

/// Draws one geometry with one stylesheet, tile by tile.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    geometry: Arc<Geometry>,
    extent: BoundingBox,
    paint: Paint,
    options: MapOptions,
    projection: SphericalMercator,
}

impl OverlayRenderer {
    pub fn new(
        geometry: Arc<Geometry>,
        stylesheet: &Stylesheet,
        tile_size: u32,
        options: MapOptions,
    ) -> Result<Self, RenderError> {
        if tile_size == 0 {
            return Err(RenderError::Canvas {
                width: tile_size,
                height: tile_size,
            });
        }
        if !options.buffer.is_finite() || options.buffer < 0.0 {
            return Err(RenderError::Style(format!(
                "buffer must be a non-negative number, got {}",
                options.buffer
            )));
        }

        let extent = geometry.bbox();
        Ok(Self {
            geometry,
            extent,
            paint: stylesheet.paint()?,
            options,
            projection: SphericalMercator::new(tile_size),
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.projection.tile_size()
    }

    /// Whether the geometry, grown by the paint reach and buffer, touches the tile.
    pub fn covers(&self, coord: &TileCoord) -> bool {
        let margin = (self.paint.reach() + self.options.buffer) as f64;
        let size = self.tile_size() as f64;
        let (x_min, y_min, x_max, y_max) = self.projection.pixel_bounds(&self.extent, coord.z);

        let tile_left = coord.x as f64 * size;
        let tile_top = coord.y as f64 * size;

        x_min - margin < tile_left + size
            && x_max + margin > tile_left
            && y_min - margin < tile_top + size
            && y_max + margin > tile_top
    }

    /// Render one tile as PNG, or `None` if nothing lands on it.
    pub fn render_tile(&self, coord: &TileCoord) -> Result<Option<Vec<u8>>, RenderError> {
        if !self.covers(coord) {
            trace!(tile = %coord, "Geometry does not reach tile");
            return Ok(None);
        }

        let size = self.tile_size();
        let mut pixmap = Pixmap::new(size, size).ok_or(RenderError::Canvas {
            width: size,
            height: size,
        })?;

        let origin = (coord.x as f64 * size as f64, coord.y as f64 * size as f64);
        let to_pixel = |p: &Position| {
            let (x, y) = self.projection.px(p[0], p[1], coord.z);
            ((x - origin.0) as f32, (y - origin.1) as f32)
        };

        for shape in self.geometry.shapes() {
            match shape {
                Shape::Point(p) => self.draw_point(&mut pixmap, to_pixel(p)),
                Shape::MultiPoint(points) => {
                    for p in points {
                        self.draw_point(&mut pixmap, to_pixel(p));
                    }
                }
                Shape::LineString(line) => self.draw_lines(&mut pixmap, &[line], &to_pixel),
                Shape::MultiLineString(lines) => {
                    let lines: Vec<&Vec<Position>> = lines.iter().collect();
                    self.draw_lines(&mut pixmap, &lines, &to_pixel);
                }
                Shape::Polygon(rings) => self.draw_polygon(&mut pixmap, rings, &to_pixel),
                Shape::MultiPolygon(polygons) => {
                    for rings in polygons {
                        self.draw_polygon(&mut pixmap, rings, &to_pixel);
                    }
                }
            }
        }

        if pixmap.pixels().iter().all(|p| p.alpha() == 0) {
            trace!(tile = %coord, "Nothing painted on tile");
            return Ok(None);
        }

        // tiny-skia stores premultiplied alpha; PNG wants straight alpha
        let mut rgba = Vec::with_capacity(size as usize * size as usize * 4);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        png::encode_png(&rgba, size, size).map(Some)
    }

    fn sk_paint(&self, color: Rgba) -> SkPaint<'static> {
        let mut paint = SkPaint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = self.options.antialias;
        paint
    }

    fn stroke(&self) -> Option<(SkPaint<'static>, Stroke)> {
        if self.paint.stroke_width <= 0.0 || self.paint.stroke.is_transparent() {
            return None;
        }
        let stroke = Stroke {
            width: self.paint.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        Some((self.sk_paint(self.paint.stroke), stroke))
    }

    fn draw_point(&self, pixmap: &mut Pixmap, (x, y): (f32, f32)) {
        if self.paint.point_radius <= 0.0 {
            return;
        }
        let Some(circle) = PathBuilder::from_circle(x, y, self.paint.point_radius) else {
            return;
        };
        if !self.paint.fill.is_transparent() {
            let paint = self.sk_paint(self.paint.fill);
            pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
        }
        if let Some((paint, stroke)) = self.stroke() {
            pixmap.stroke_path(&circle, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn draw_lines<F>(&self, pixmap: &mut Pixmap, lines: &[&Vec<Position>], to_pixel: &F)
    where
        F: Fn(&Position) -> (f32, f32),
    {
        let Some((paint, stroke)) = self.stroke() else {
            return;
        };
        let mut pb = PathBuilder::new();
        for line in lines {
            append_run(&mut pb, line, to_pixel, false);
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn draw_polygon<F>(&self, pixmap: &mut Pixmap, rings: &[Vec<Position>], to_pixel: &F)
    where
        F: Fn(&Position) -> (f32, f32),
    {
        let mut pb = PathBuilder::new();
        for ring in rings {
            append_run(&mut pb, ring, to_pixel, true);
        }
        let Some(path) = pb.finish() else {
            return;
        };

        if !self.paint.fill.is_transparent() {
            let paint = self.sk_paint(self.paint.fill);
            pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
        }
        if let Some((paint, stroke)) = self.stroke() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }
}

fn append_run<F>(pb: &mut PathBuilder, positions: &[Position], to_pixel: &F, close: bool)
where
    F: Fn(&Position) -> (f32, f32),
{
    let Some((first, rest)) = positions.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    let (x, y) = to_pixel(first);
    pb.move_to(x, y);
    for p in rest {
        let (x, y) = to_pixel(p);
        pb.line_to(x, y);
    }
    if close {
        pb.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_options_defaults() {
        let options = MapOptions::from_value(&serde_json::Value::Null).unwrap();
        assert!(options.antialias);
        assert_eq!(options.buffer, 0.0);

        let options =
            MapOptions::from_value(&serde_json::json!({ "antialias": false, "other": 1 })).unwrap();
        assert!(!options.antialias);
    }

    #[test]
    fn test_map_options_wrong_type() {
        assert!(MapOptions::from_value(&serde_json::json!({ "buffer": "wide" })).is_err());
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let geometry = Arc::new(Geometry::point(0.0, 0.0));
        let result = OverlayRenderer::new(geometry, &Stylesheet::default(), 0, MapOptions::default());
        assert!(matches!(result, Err(RenderError::Canvas { .. })));
    }
}
