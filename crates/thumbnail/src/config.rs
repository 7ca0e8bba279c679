//! Per-render options and pipeline-wide configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use renderer::ImageFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thumbnail_common::tile::MAX_ZOOM;
use thumbnail_common::{InputError, ThumbnailError, ThumbnailResult, ZoomRange};

use crate::request::{DEFAULT_FETCH_LIMIT, DEFAULT_SCALE};
use crate::sources::{BackgroundDescriptor, BackgroundPreset};

/// Default lowest zoom a thumbnail may be rendered at.
pub const DEFAULT_MIN_ZOOM: i64 = 0;

/// Default highest zoom a thumbnail may be rendered at.
pub const DEFAULT_MAX_ZOOM: i64 = 22;

fn default_min_zoom() -> i64 {
    DEFAULT_MIN_ZOOM
}

fn default_max_zoom() -> i64 {
    DEFAULT_MAX_ZOOM
}

fn default_blend_format() -> String {
    ImageFormat::Png.to_string()
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn default_fetch_limit() -> i64 {
    DEFAULT_FETCH_LIMIT as i64
}

/// Options for one thumbnail render.
///
/// JSON keys are camelCase (`backgroundTileJSON`, `thumbnailMinZoom`, ...).
/// Unknown keys are ignored. Values are range-checked by [`validate`],
/// which the pipeline calls once the render is under way.
///
/// [`validate`]: ThumbnailOptions::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailOptions {
    /// Background basemap; `None` uses [`PipelineConfig::default_background`].
    #[serde(rename = "backgroundTileJSON", alias = "background", default)]
    pub background: Option<BackgroundDescriptor>,

    #[serde(default = "default_min_zoom")]
    pub thumbnail_min_zoom: i64,

    #[serde(default = "default_max_zoom")]
    pub thumbnail_max_zoom: i64,

    /// Stylesheet template; `None` uses the built-in template.
    #[serde(default)]
    pub stylesheet: Option<String>,

    /// Values for the stylesheet template's placeholders.
    #[serde(default)]
    pub style_variables: BTreeMap<String, Value>,

    /// Encoding of blended tiles and of the final image: `png` or `jpeg`.
    #[serde(default = "default_blend_format")]
    pub blend_format: String,

    /// Passed through to the overlay rasterizer.
    #[serde(default)]
    pub map_options: Value,

    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Most tiles the stitcher may fetch.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: i64,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            background: None,
            thumbnail_min_zoom: DEFAULT_MIN_ZOOM,
            thumbnail_max_zoom: DEFAULT_MAX_ZOOM,
            stylesheet: None,
            style_variables: BTreeMap::new(),
            blend_format: default_blend_format(),
            map_options: Value::Null,
            scale: DEFAULT_SCALE,
            fetch_limit: DEFAULT_FETCH_LIMIT as i64,
        }
    }
}

/// Options after range checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedOptions {
    pub zoom_range: ZoomRange,
    pub format: ImageFormat,
}

impl ThumbnailOptions {
    /// Parse caller options. `null` means defaults; anything but an object
    /// is a caller error.
    pub fn from_json(value: Value) -> Result<Self, InputError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|e| InputError::MalformedOptions(e.to_string())),
            other => Err(InputError::OptionsNotObject(json_kind(&other).to_string())),
        }
    }

    /// Check zoom bounds and the blend format.
    pub fn validate(&self) -> ThumbnailResult<ValidatedOptions> {
        let zoom = |option: &str, value: i64| -> ThumbnailResult<u8> {
            if (0..=MAX_ZOOM as i64).contains(&value) {
                Ok(value as u8)
            } else {
                Err(ThumbnailError::config(
                    option,
                    format!("{} is outside 0..={}", value, MAX_ZOOM),
                ))
            }
        };
        let min = zoom("thumbnailMinZoom", self.thumbnail_min_zoom)?;
        let max = zoom("thumbnailMaxZoom", self.thumbnail_max_zoom)?;
        let zoom_range = ZoomRange::new(min, max).ok_or_else(|| {
            ThumbnailError::config(
                "thumbnailMinZoom",
                format!("{} is greater than thumbnailMaxZoom {}", min, max),
            )
        })?;

        let format = self
            .blend_format
            .parse::<ImageFormat>()
            .map_err(|e| ThumbnailError::config("blendFormat", e.to_string()))?;

        Ok(ValidatedOptions { zoom_range, format })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Settings shared by every render a pipeline performs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Token for token-gated presets such as Mapbox satellite.
    pub access_token: Option<String>,
    /// Background used when a render names none.
    pub default_background: BackgroundPreset,
    /// Tile fetches the stitcher keeps in flight.
    pub stitch_concurrency: usize,
    /// Timeout for every HTTP request to background sources.
    pub http_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            default_background: BackgroundPreset::MapboxSatellite,
            stitch_concurrency: 16,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn validate(&self) -> ThumbnailResult<()> {
        if self.stitch_concurrency == 0 {
            return Err(ThumbnailError::config(
                "stitch_concurrency",
                "must be at least 1",
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(ThumbnailError::config("http_timeout", "must be positive"));
        }
        Ok(())
    }

    /// Descriptor to use for a render's background option.
    pub fn background_for(&self, requested: Option<&BackgroundDescriptor>) -> BackgroundDescriptor {
        requested
            .cloned()
            .unwrap_or_else(|| BackgroundDescriptor::preset(self.default_background))
    }
}
