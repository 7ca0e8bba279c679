//! Named background presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thumbnail_common::SourceError;

use super::tilejson::TileJson;

const MAPBOX_SATELLITE_TILES: &str =
    "https://api.mapbox.com/v4/mapbox.satellite/{z}/{x}/{y}.png?access_token=";

const NATURAL_EARTH_TILES: &str =
    "https://naturalearthtiles.org/tiles/natural_earth_2_shaded_relief.raster/{z}/{x}/{y}.png";

/// Built-in basemaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundPreset {
    /// Mapbox satellite imagery; needs an access token.
    #[default]
    MapboxSatellite,
    /// Natural Earth shaded relief; no token, shallow zooms only.
    NaturalEarth,
}

impl BackgroundPreset {
    /// Expand into a TileJSON document.
    pub fn tilejson(&self, access_token: Option<&str>) -> Result<TileJson, SourceError> {
        match self {
            BackgroundPreset::MapboxSatellite => {
                let token = access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
                    SourceError::InvalidDescriptor(
                        "the mapbox-satellite background needs an access token".to_string(),
                    )
                })?;
                Ok(TileJson {
                    name: Some("Mapbox Satellite".to_string()),
                    attribution: Some("© Mapbox © Maxar".to_string()),
                    maxzoom: 19,
                    ..TileJson::from_template(format!("{}{}", MAPBOX_SATELLITE_TILES, token))
                })
            }
            BackgroundPreset::NaturalEarth => Ok(TileJson {
                name: Some("Natural Earth II".to_string()),
                attribution: Some("Natural Earth".to_string()),
                maxzoom: 6,
                ..TileJson::from_template(NATURAL_EARTH_TILES)
            }),
        }
    }
}

impl fmt::Display for BackgroundPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundPreset::MapboxSatellite => write!(f, "mapbox-satellite"),
            BackgroundPreset::NaturalEarth => write!(f, "natural-earth"),
        }
    }
}

impl FromStr for BackgroundPreset {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mapbox-satellite" | "satellite" => Ok(BackgroundPreset::MapboxSatellite),
            "natural-earth" => Ok(BackgroundPreset::NaturalEarth),
            other => Err(SourceError::InvalidDescriptor(format!(
                "unknown background preset {:?}",
                other
            ))),
        }
    }
}
