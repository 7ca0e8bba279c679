//! Translation of command-line flags into render options.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use thumbnail::{BackgroundDescriptor, BackgroundPreset, ImageFormat};

/// Flags that shape a single render.
#[derive(Debug, Default)]
pub struct RenderFlags {
    pub min_zoom: Option<i64>,
    pub max_zoom: Option<i64>,
    pub format: Option<ImageFormat>,
    pub tilejson: Option<String>,
    pub preset: Option<BackgroundPreset>,
    pub stylesheet: Option<String>,
    pub style_vars: Vec<(String, Value)>,
    pub scale: Option<f64>,
    pub fetch_limit: Option<i64>,
}

/// Split a `key=value` flag. The value is read as JSON when it parses,
/// otherwise kept as a string.
pub fn parse_style_var(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in {:?}", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Output format from the file extension, when it names one.
pub fn format_for_path(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
}

/// A `--tilejson` argument: URLs pass through, anything else is a file.
pub async fn background_from_arg(arg: &str) -> Result<BackgroundDescriptor> {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        return Ok(BackgroundDescriptor::Url(arg.to_string()));
    }
    let text = tokio::fs::read_to_string(arg)
        .await
        .with_context(|| format!("reading TileJSON file {}", arg))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing TileJSON file {}", arg))?;
    Ok(BackgroundDescriptor::TileJson(value))
}

/// Build the JSON options object handed to the pipeline.
pub async fn build_options(flags: &RenderFlags) -> Result<Value> {
    let mut options = Map::new();

    if let Some(min) = flags.min_zoom {
        options.insert("thumbnailMinZoom".into(), min.into());
    }
    if let Some(max) = flags.max_zoom {
        options.insert("thumbnailMaxZoom".into(), max.into());
    }
    if let Some(format) = flags.format {
        options.insert("blendFormat".into(), format.to_string().into());
    }
    if let Some(scale) = flags.scale {
        options.insert("scale".into(), scale.into());
    }
    if let Some(limit) = flags.fetch_limit {
        options.insert("fetchLimit".into(), limit.into());
    }

    let background = match (&flags.tilejson, flags.preset) {
        (Some(_), Some(_)) => bail!("--tilejson and --preset are mutually exclusive"),
        (Some(arg), None) => Some(background_from_arg(arg).await?),
        (None, Some(preset)) => Some(BackgroundDescriptor::preset(preset)),
        (None, None) => None,
    };
    if let Some(background) = background {
        options.insert("backgroundTileJSON".into(), serde_json::to_value(background)?);
    }

    if let Some(path) = &flags.stylesheet {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading stylesheet {}", path))?;
        options.insert("stylesheet".into(), template.into());
    }
    if !flags.style_vars.is_empty() {
        let vars: Map<String, Value> = flags.style_vars.iter().cloned().collect();
        options.insert("styleVariables".into(), Value::Object(vars));
    }

    Ok(Value::Object(options))
}

/// Read the input GeoJSON file.
pub async fn read_geojson(path: &Path) -> Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| anyhow!("{} is not JSON: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use thumbnail::ThumbnailOptions;

    #[test]
    fn test_parse_style_var() {
        assert_eq!(
            parse_style_var("fill=#00FF00").unwrap(),
            ("fill".to_string(), Value::String("#00FF00".to_string()))
        );
        assert_eq!(
            parse_style_var("fill_opacity=0.8").unwrap(),
            ("fill_opacity".to_string(), serde_json::json!(0.8))
        );
        assert!(parse_style_var("novalue").is_err());
        assert!(parse_style_var("=1").is_err());
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(Path::new("a/b.jpg")), Some(ImageFormat::Jpeg));
        assert_eq!(format_for_path(Path::new("thumb.PNG")), Some(ImageFormat::Png));
        assert_eq!(format_for_path(Path::new("thumb.webp")), None);
        assert_eq!(format_for_path(Path::new("thumb.png")), Some(ImageFormat::Png));
        assert_eq!(format_for_path(Path::new("thumb")), None);
    }

    #[tokio::test]
    async fn test_options_round_trip_through_pipeline_parser() {
        let flags = RenderFlags {
            min_zoom: Some(2),
            max_zoom: Some(9),
            format: Some(ImageFormat::Jpeg),
            preset: Some(BackgroundPreset::NaturalEarth),
            style_vars: vec![("stroke_width".to_string(), serde_json::json!(4))],
            ..RenderFlags::default()
        };

        let options = ThumbnailOptions::from_json(build_options(&flags).await.unwrap()).unwrap();

        assert_eq!(options.thumbnail_min_zoom, 2);
        assert_eq!(options.thumbnail_max_zoom, 9);
        assert_eq!(options.blend_format, "jpeg");
        assert_eq!(
            options.background,
            Some(BackgroundDescriptor::preset(BackgroundPreset::NaturalEarth))
        );
        assert_eq!(options.style_variables["stroke_width"], serde_json::json!(4));
    }

    #[tokio::test]
    async fn test_tilejson_file_is_embedded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tiles": ["https://t.example/{{z}}/{{x}}/{{y}}.png"], "maxzoom": 10}}"#
        )
        .unwrap();

        let descriptor = background_from_arg(file.path().to_str().unwrap()).await.unwrap();
        match descriptor {
            BackgroundDescriptor::TileJson(value) => assert_eq!(value["maxzoom"], 10),
            other => panic!("expected embedded TileJSON, got {:?}", other),
        }

        let url = background_from_arg("https://t.example/tiles.json").await.unwrap();
        assert!(matches!(url, BackgroundDescriptor::Url(_)));
    }

    #[tokio::test]
    async fn test_conflicting_backgrounds() {
        let flags = RenderFlags {
            tilejson: Some("https://t.example/tiles.json".to_string()),
            preset: Some(BackgroundPreset::NaturalEarth),
            ..RenderFlags::default()
        };
        assert!(build_options(&flags).await.is_err());
    }
}
