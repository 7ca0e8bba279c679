//! GeoJSON thumbnail rendering.
//!
//! Given a geometry and a few options, the pipeline picks a zoom, pads the
//! geometry's extent, layers a styled rendering of the geometry over a
//! raster basemap and stitches the covering tiles into one image.
//!
//! # Modules
//!
//! - [`zoom`] / [`planner`]: zoom selection and extent padding
//! - [`sources`]: background basemaps (TileJSON, presets, HTTP)
//! - [`overlay`]: the geometry as a tile source
//! - [`composite`]: background + overlay as one tile source, with stats
//! - [`template`]: stylesheet templating
//! - [`request`] / [`stitch`]: request assembly and tile stitching
//! - [`pipeline`]: orchestration and the callback entry point
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use thumbnail::{PipelineConfig, ThumbnailPipeline};
//!
//! let pipeline = Arc::new(ThumbnailPipeline::new(PipelineConfig::default())?);
//! pipeline.render_thumbnail(geojson, serde_json::json!({}), |result| {
//!     // ...
//! })?;
//! ```

pub mod blend;
pub mod composite;
pub mod config;
pub mod overlay;
pub mod pipeline;
pub mod planner;
pub mod request;
pub mod sources;
pub mod stitch;
pub mod template;
pub mod zoom;

pub use blend::{Blender, ImageBlender};
pub use composite::{CompositeSource, CompositeStats, TileFetcher};
pub use config::{PipelineConfig, ThumbnailOptions, ValidatedOptions};
pub use overlay::{ImageOptions, OverlayFactory, OverlaySource, RasterOverlayFactory};
pub use pipeline::{PipelineBuilder, PipelineStage, StageFailure, Thumbnail, ThumbnailPipeline};
pub use planner::{ZoomExtentPlanner, ZoomPlan};
pub use request::{RenderRequest, RenderRequestBuilder};
pub use sources::{
    BackgroundDescriptor, BackgroundLoader, BackgroundPreset, BackgroundSource,
    HttpBackgroundLoader, TileJson,
};
pub use stitch::{Headers, MosaicStitcher, StitchedImage, Stitcher};
pub use template::{Templatizer, DEFAULT_TEMPLATE};
pub use zoom::decide_zoom;

pub use renderer::{ImageFormat, Stylesheet, MAX_CANVAS_PIXELS};
pub use thumbnail_common::{
    BoundingBox, Geometry, InputError, SourceError, ThumbnailError, ThumbnailResult, TileCoord,
    ZoomRange,
};
