//! GeoJSON thumbnail renderer.
//!
//! Reads a GeoJSON file, renders it over a raster basemap and writes the
//! image:
//!
//! ```text
//! thumbnail-cli --input feature.geojson --output thumb.png --preset natural-earth
//! ```

mod options;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use options::{build_options, format_for_path, parse_style_var, read_geojson, RenderFlags};
use thumbnail::{
    BackgroundPreset, Geometry, ImageFormat, PipelineConfig, ThumbnailOptions, ThumbnailPipeline,
};

#[derive(Parser, Debug)]
#[command(name = "thumbnail-cli")]
#[command(about = "Render a thumbnail image for a GeoJSON geometry")]
struct Args {
    /// GeoJSON file to render
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the image
    #[arg(short, long)]
    output: PathBuf,

    /// Lowest zoom the thumbnail may use
    #[arg(long)]
    min_zoom: Option<i64>,

    /// Highest zoom the thumbnail may use
    #[arg(long)]
    max_zoom: Option<i64>,

    /// Output format (png or jpeg); defaults to the output file's extension
    #[arg(short, long)]
    format: Option<ImageFormat>,

    /// Background TileJSON, as a URL or a local file
    #[arg(long, conflicts_with = "preset")]
    tilejson: Option<String>,

    /// Built-in background (satellite, natural-earth)
    #[arg(long)]
    preset: Option<BackgroundPreset>,

    /// Stylesheet template file
    #[arg(long)]
    stylesheet: Option<String>,

    /// Stylesheet variable, repeatable (e.g. --style-var fill=#00FF00)
    #[arg(long = "style-var", value_parser = parse_style_var)]
    style_vars: Vec<(String, serde_json::Value)>,

    /// Output scale factor
    #[arg(long)]
    scale: Option<f64>,

    /// Most background tiles one render may fetch
    #[arg(long)]
    fetch_limit: Option<i64>,

    /// Mapbox access token for the satellite background
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Tile fetches kept in flight
    #[arg(long, env = "THUMBNAIL_CONCURRENCY", default_value = "16")]
    concurrency: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Print render statistics as JSON on stdout
    #[arg(long)]
    stats: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = PipelineConfig {
        access_token: args.access_token.clone(),
        stitch_concurrency: args.concurrency,
        http_timeout: Duration::from_secs(args.timeout_secs),
        ..PipelineConfig::default()
    };
    let pipeline = ThumbnailPipeline::new(config)?;

    let flags = RenderFlags {
        min_zoom: args.min_zoom,
        max_zoom: args.max_zoom,
        format: args.format.or_else(|| format_for_path(&args.output)),
        tilejson: args.tilejson.clone(),
        preset: args.preset,
        stylesheet: args.stylesheet.clone(),
        style_vars: args.style_vars.clone(),
        scale: args.scale,
        fetch_limit: args.fetch_limit,
    };

    let geometry = Geometry::from_value(read_geojson(&args.input).await?)
        .with_context(|| format!("invalid geometry in {}", args.input.display()))?;
    let options = ThumbnailOptions::from_json(build_options(&flags).await?)?;

    info!(
        input = %args.input.display(),
        coordinates = geometry.coordinate_count(),
        "Rendering thumbnail"
    );

    let thumbnail = pipeline
        .render(geometry, options)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))?;

    tokio::fs::write(&args.output, &thumbnail.image)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        bytes = thumbnail.image.len(),
        zoom = thumbnail.plan.zoom,
        tiles = thumbnail.stats.tiles,
        "Thumbnail written"
    );

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&thumbnail.stats)?);
    }

    Ok(())
}
