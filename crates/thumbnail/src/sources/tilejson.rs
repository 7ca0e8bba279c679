//! TileJSON documents describing raster backgrounds.

use serde::{Deserialize, Serialize};
use thumbnail_common::tile::MAX_ZOOM;
use thumbnail_common::{SourceError, TileCoord, ZoomRange};

fn default_maxzoom() -> u8 {
    22
}

fn default_tile_size() -> u32 {
    256
}

/// Row numbering of a tile URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileScheme {
    /// Row 0 at the north edge.
    #[default]
    Xyz,
    /// Row 0 at the south edge.
    Tms,
}

/// The subset of TileJSON 2.x/3.x a raster background needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilejson: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    /// URL templates containing `{z}`, `{x}` and `{y}` (or `{-y}`).
    #[serde(default)]
    pub tiles: Vec<String>,
    #[serde(default)]
    pub minzoom: u8,
    #[serde(default = "default_maxzoom")]
    pub maxzoom: u8,
    #[serde(rename = "tileSize", alias = "tilesize", default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default)]
    pub scheme: TileScheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 4]>,
}

impl TileJson {
    /// TileJSON with one URL template and default metadata.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            tilejson: Some("2.2.0".to_string()),
            name: None,
            attribution: None,
            tiles: vec![template.into()],
            minzoom: 0,
            maxzoom: default_maxzoom(),
            tile_size: default_tile_size(),
            scheme: TileScheme::Xyz,
            bounds: None,
        }
    }

    /// Parse a TileJSON value, mapping every failure to an invalid descriptor.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SourceError> {
        if !value.is_object() {
            return Err(SourceError::InvalidDescriptor(
                "TileJSON must be an object".to_string(),
            ));
        }
        let tilejson: TileJson = serde_json::from_value(value)
            .map_err(|e| SourceError::InvalidDescriptor(format!("malformed TileJSON: {}", e)))?;
        tilejson.validate()?;
        Ok(tilejson)
    }

    /// Check templates, zoom range and tile size; return the zoom range.
    pub fn validate(&self) -> Result<ZoomRange, SourceError> {
        if self.tiles.is_empty() {
            return Err(SourceError::InvalidDescriptor(
                "TileJSON has no tile URL templates".to_string(),
            ));
        }
        let has_placeholders = |t: &String| {
            t.contains("{z}") && t.contains("{x}") && (t.contains("{y}") || t.contains("{-y}"))
        };
        if let Some(template) = self.tiles.iter().find(|t| !has_placeholders(t)) {
            return Err(SourceError::InvalidDescriptor(format!(
                "tile template {:?} lacks {{z}}/{{x}}/{{y}} placeholders",
                template
            )));
        }
        if self.tile_size == 0 {
            return Err(SourceError::InvalidDescriptor(
                "tileSize must be positive".to_string(),
            ));
        }
        ZoomRange::new(self.minzoom, self.maxzoom).ok_or_else(|| {
            SourceError::InvalidDescriptor(format!(
                "zoom range {}..={} must satisfy minzoom <= maxzoom <= {}",
                self.minzoom, self.maxzoom, MAX_ZOOM
            ))
        })
    }

    /// Tile URL for `coord`, spreading requests across templates.
    pub fn tile_url(&self, coord: &TileCoord) -> Option<String> {
        if self.tiles.is_empty() {
            return None;
        }
        let index = (coord.x as usize + coord.y as usize) % self.tiles.len();
        let y = match self.scheme {
            TileScheme::Xyz => coord.y,
            TileScheme::Tms => coord.tms_y(),
        };
        Some(
            self.tiles[index]
                .replace("{z}", &coord.z.to_string())
                .replace("{x}", &coord.x.to_string())
                .replace("{-y}", &coord.tms_y().to_string())
                .replace("{y}", &y.to_string()),
        )
    }
}
