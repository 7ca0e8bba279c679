//! Render orchestration.
//!
//! A render walks a fixed sequence of stages. Each stage runs only after
//! the previous one succeeded, and the first failure ends the render:
//!
//! ```text
//! Init -> StylesheetReady -> BackgroundReady -> SourcesComposed -> Stitching -> Done
//!                                  (any stage fails) -> Failed
//! ```
//!
//! Nothing is shared between renders except the immutable collaborators
//! held by [`ThumbnailPipeline`]; every render builds its own plan,
//! composite source and stats.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use thumbnail_common::{Geometry, InputError, ThumbnailError, ThumbnailResult};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::blend::{Blender, ImageBlender};
use crate::composite::{CompositeSource, CompositeStats};
use crate::config::{PipelineConfig, ThumbnailOptions};
use crate::overlay::{ImageOptions, OverlayFactory, RasterOverlayFactory};
use crate::planner::{ZoomExtentPlanner, ZoomPlan};
use crate::request::RenderRequestBuilder;
use crate::sources::{BackgroundLoader, HttpBackgroundLoader};
use crate::stitch::{Headers, MosaicStitcher, Stitcher};
use crate::template::{Templatizer, DEFAULT_TEMPLATE};

/// Where a render is in its stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    StylesheetReady,
    BackgroundReady,
    SourcesComposed,
    Stitching,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Init => "init",
            PipelineStage::StylesheetReady => "stylesheet_ready",
            PipelineStage::BackgroundReady => "background_ready",
            PipelineStage::SourcesComposed => "sources_composed",
            PipelineStage::Stitching => "stitching",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A finished thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub image: Bytes,
    pub headers: Headers,
    pub stats: CompositeStats,
    /// Zoom and padded extent the image was rendered at.
    pub plan: ZoomPlan,
}

/// Failure of a render, with the last stage it completed.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub error: ThumbnailError,
}

/// Renders thumbnails. Cheap to share behind an `Arc`.
pub struct ThumbnailPipeline {
    config: PipelineConfig,
    loader: Arc<dyn BackgroundLoader>,
    overlays: Arc<dyn OverlayFactory>,
    blender: Arc<dyn Blender>,
    stitcher: Arc<dyn Stitcher>,
    templatizer: Templatizer,
    planner: ZoomExtentPlanner,
}

impl ThumbnailPipeline {
    /// Pipeline with HTTP backgrounds, raster overlays and the mosaic stitcher.
    pub fn new(config: PipelineConfig) -> ThumbnailResult<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: PipelineConfig) -> PipelineBuilder {
        PipelineBuilder {
            config,
            loader: None,
            overlays: None,
            blender: None,
            stitcher: None,
            templatizer: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Render a thumbnail of `geometry`.
    pub async fn render(
        &self,
        geometry: Geometry,
        options: ThumbnailOptions,
    ) -> ThumbnailResult<Thumbnail> {
        self.render_staged(geometry, options)
            .await
            .map_err(|failure| failure.error)
    }

    /// Like [`render`](Self::render), but reports how far a failed render got.
    #[instrument(skip_all, fields(coordinates = geometry.coordinate_count()))]
    pub async fn render_staged(
        &self,
        geometry: Geometry,
        options: ThumbnailOptions,
    ) -> Result<Thumbnail, StageFailure> {
        let mut stage = PipelineStage::Init;
        match self.run(geometry, options, &mut stage).await {
            Ok(thumbnail) => {
                advance(&mut stage, PipelineStage::Done);
                info!(
                    zoom = thumbnail.plan.zoom,
                    tiles = thumbnail.stats.tiles,
                    blended = thumbnail.stats.blended,
                    bytes = thumbnail.image.len(),
                    "Thumbnail rendered"
                );
                Ok(thumbnail)
            }
            Err(error) => {
                warn!(
                    completed = %stage,
                    kind = error.kind(),
                    error = %error,
                    "Thumbnail render failed"
                );
                let completed = stage;
                advance(&mut stage, PipelineStage::Failed);
                Err(StageFailure {
                    stage: completed,
                    error,
                })
            }
        }
    }

    async fn run(
        &self,
        geometry: Geometry,
        options: ThumbnailOptions,
        stage: &mut PipelineStage,
    ) -> ThumbnailResult<Thumbnail> {
        let settings = options.validate()?;

        let template = options.stylesheet.as_deref().unwrap_or(DEFAULT_TEMPLATE);
        let stylesheet = self.templatizer.resolve(template, &options.style_variables)?;
        advance(stage, PipelineStage::StylesheetReady);

        let descriptor = self.config.background_for(options.background.as_ref());
        let background = self.loader.load(&descriptor).await?;
        let tile_size = background.tile_size();
        let background_zooms = background.zoom_range();
        advance(stage, PipelineStage::BackgroundReady);

        let geometry = Arc::new(geometry);
        let image_options = ImageOptions {
            tile_size,
            map_options: options.map_options.clone(),
        };
        let overlay = self
            .overlays
            .build(Arc::clone(&geometry), &stylesheet, &image_options)?;
        let composite = Arc::new(CompositeSource::new(
            background,
            overlay,
            Arc::clone(&self.blender),
            settings.format,
        ));
        advance(stage, PipelineStage::SourcesComposed);

        let plan = self
            .planner
            .plan(&geometry.bbox(), background_zooms, settings.zoom_range)?;
        let request = RenderRequestBuilder::new(composite.clone())
            .plan(&plan)
            .tile_size(tile_size as i64)
            .format(settings.format)
            .scale(options.scale)
            .fetch_limit(options.fetch_limit)
            .build()?;
        advance(stage, PipelineStage::Stitching);

        let stitched = self.stitcher.assemble(request).await?;
        Ok(Thumbnail {
            image: stitched.image,
            headers: stitched.headers,
            stats: composite.stats(),
            plan,
        })
    }

    /// Callback form of [`render`](Self::render).
    ///
    /// Geometry and options are checked before anything is scheduled; a
    /// broken caller contract comes back as `Err` and `callback` is dropped
    /// without being called. Otherwise the render runs on a spawned task
    /// and `callback` receives its result exactly once. Must be called from
    /// within a Tokio runtime.
    pub fn render_thumbnail<F>(
        self: &Arc<Self>,
        geojson: Value,
        options: Value,
        callback: F,
    ) -> Result<JoinHandle<()>, InputError>
    where
        F: FnOnce(ThumbnailResult<Thumbnail>) + Send + 'static,
    {
        let geometry = Geometry::from_value(geojson)?;
        let options = ThumbnailOptions::from_json(options)?;

        let pipeline = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let result = pipeline.render(geometry, options).await;
            callback(result);
        }))
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug!(from = %stage, to = %next, "Pipeline stage");
    *stage = next;
}

/// Swaps collaborators, mostly for tests and custom deployments.
pub struct PipelineBuilder {
    config: PipelineConfig,
    loader: Option<Arc<dyn BackgroundLoader>>,
    overlays: Option<Arc<dyn OverlayFactory>>,
    blender: Option<Arc<dyn Blender>>,
    stitcher: Option<Arc<dyn Stitcher>>,
    templatizer: Option<Templatizer>,
}

impl PipelineBuilder {
    pub fn loader(mut self, loader: Arc<dyn BackgroundLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn overlay_factory(mut self, overlays: Arc<dyn OverlayFactory>) -> Self {
        self.overlays = Some(overlays);
        self
    }

    pub fn blender(mut self, blender: Arc<dyn Blender>) -> Self {
        self.blender = Some(blender);
        self
    }

    pub fn stitcher(mut self, stitcher: Arc<dyn Stitcher>) -> Self {
        self.stitcher = Some(stitcher);
        self
    }

    pub fn templatizer(mut self, templatizer: Templatizer) -> Self {
        self.templatizer = Some(templatizer);
        self
    }

    pub fn build(self) -> ThumbnailResult<ThumbnailPipeline> {
        self.config.validate()?;

        let loader: Arc<dyn BackgroundLoader> = match self.loader {
            Some(loader) => loader,
            None => Arc::new(
                HttpBackgroundLoader::new(self.config.http_timeout, self.config.access_token.clone())
                    .map_err(|e| ThumbnailError::config("http_client", e.to_string()))?,
            ),
        };
        let stitcher = self
            .stitcher
            .unwrap_or_else(|| Arc::new(MosaicStitcher::new(self.config.stitch_concurrency)));

        Ok(ThumbnailPipeline {
            loader,
            overlays: self.overlays.unwrap_or_else(|| Arc::new(RasterOverlayFactory)),
            blender: self.blender.unwrap_or_else(|| Arc::new(ImageBlender)),
            stitcher,
            templatizer: self.templatizer.unwrap_or_default(),
            planner: ZoomExtentPlanner::default(),
            config: self.config,
        })
    }
}
