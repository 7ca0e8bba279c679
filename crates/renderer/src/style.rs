//! Stylesheet model for overlay rendering.
//!
//! Property names follow the GeoJSON simplestyle convention (`fill`,
//! `fill-opacity`, `stroke`, `stroke-width`, `stroke-opacity`) plus
//! `point-radius` for point markers.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Straight-alpha RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#RRGGBB` colour and apply an opacity in `[0, 1]`.
    pub fn from_hex(hex: &str, opacity: f32) -> Option<Self> {
        let (r, g, b) = hex_to_rgb(hex)?;
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Some(Self { r, g, b, a })
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// How the overlay geometry is painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Stylesheet {
    pub fill: String,
    pub fill_opacity: f32,
    pub stroke: String,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
    pub point_radius: f32,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self {
            fill: "#FF5500".to_string(),
            fill_opacity: 0.3,
            stroke: "#FF5500".to_string(),
            stroke_width: 2.0,
            stroke_opacity: 1.0,
            point_radius: 6.0,
        }
    }
}

/// A stylesheet with colours parsed and numbers checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f32,
    pub point_radius: f32,
}

impl Paint {
    /// Pixels a painted shape may extend past its geometry.
    pub fn reach(&self) -> f32 {
        (self.stroke_width / 2.0).max(self.point_radius)
    }
}

impl Stylesheet {
    /// Parse and validate a stylesheet document.
    pub fn from_json(json_str: &str) -> Result<Self, RenderError> {
        let sheet: Stylesheet =
            serde_json::from_str(json_str).map_err(|e| RenderError::Style(e.to_string()))?;
        sheet.paint()?;
        Ok(sheet)
    }

    /// Resolve colours and check numeric ranges.
    pub fn paint(&self) -> Result<Paint, RenderError> {
        for (name, value) in [
            ("fill-opacity", self.fill_opacity),
            ("stroke-opacity", self.stroke_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RenderError::Style(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("stroke-width", self.stroke_width),
            ("point-radius", self.point_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RenderError::Style(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let color = |name: &str, hex: &str, opacity: f32| {
            Rgba::from_hex(hex, opacity)
                .ok_or_else(|| RenderError::Style(format!("{} is not a #RRGGBB colour: {:?}", name, hex)))
        };

        Ok(Paint {
            fill: color("fill", &self.fill, self.fill_opacity)?,
            stroke: color("stroke", &self.stroke, self.stroke_opacity)?,
            stroke_width: self.stroke_width,
            point_radius: self.point_radius,
        })
    }
}
