//! End-to-end renders through the pipeline with mocked backgrounds.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common::{
    full_range, range, BrokenOverlay, CountingBlender, FixedOverlayFactory, SolidBackground,
    StaticLoader,
};
use serde_json::{json, Value};
use test_utils::{decode_rgba, fixtures};
use thumbnail::stitch::{CONTENT_TYPE, TILE_COUNT};
use thumbnail::{
    Geometry, InputError, PipelineConfig, PipelineStage, SourceError, Thumbnail, ThumbnailError,
    ThumbnailOptions, ThumbnailPipeline, ThumbnailResult,
};
use tokio::sync::oneshot;

fn pipeline_with(background: SolidBackground) -> Arc<ThumbnailPipeline> {
    let pipeline = ThumbnailPipeline::builder(PipelineConfig::default())
        .loader(Arc::new(StaticLoader::new(Arc::new(background))))
        .build()
        .unwrap();
    Arc::new(pipeline)
}

/// Run the callback form and wait for its single invocation.
async fn render_via_callback(
    pipeline: &Arc<ThumbnailPipeline>,
    geojson: Value,
    options: Value,
) -> ThumbnailResult<Thumbnail> {
    let (tx, rx) = oneshot::channel();
    let handle = pipeline
        .render_thumbnail(geojson, options, move |result| {
            let _ = tx.send(result);
        })
        .unwrap();
    handle.await.unwrap();
    rx.await.unwrap()
}

fn geojson(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn test_point_at_origin_renders() {
    let pipeline = pipeline_with(SolidBackground::new(256, range(0, 18)));

    let thumbnail = render_via_callback(&pipeline, geojson(fixtures::POINT_ORIGIN), json!({}))
        .await
        .unwrap();

    assert!(thumbnail.plan.zoom <= 18);
    assert!(!thumbnail.plan.bbox.is_degenerate());
    assert!(thumbnail.stats.tiles >= 1);
    assert_eq!(
        thumbnail.stats.blended + thumbnail.stats.background_only,
        thumbnail.stats.tiles
    );
    assert_eq!(thumbnail.headers[CONTENT_TYPE], "image/png");
    assert_eq!(thumbnail.headers[TILE_COUNT], thumbnail.stats.tiles.to_string());

    // 200 px of padding on every side of the point.
    let image = decode_rgba(&thumbnail.image);
    assert!((399..=401).contains(&image.width()), "width {}", image.width());
    assert!((399..=401).contains(&image.height()), "height {}", image.height());
}

#[tokio::test]
async fn test_polygon_is_drawn_over_background() {
    let pipeline = pipeline_with(SolidBackground::new(256, full_range()));
    let geometry = Geometry::from_geojson(fixtures::FEATURE_COLLECTION).unwrap();

    let thumbnail = pipeline
        .render(geometry, ThumbnailOptions::default())
        .await
        .unwrap();

    assert_eq!(thumbnail.plan.zoom, 11);
    assert!(thumbnail.stats.blended >= 1);

    // The default style fills polygons with translucent orange.
    let image = decode_rgba(&thumbnail.image);
    let centre = image.get_pixel(image.width() / 2, image.height() / 2).0;
    assert!(centre[0] > 0, "expected overlay colour, got {:?}", centre);
    assert_ne!(centre, common::BLUE);
}

#[tokio::test]
async fn test_missing_geometry_fails_synchronously() {
    let pipeline = pipeline_with(SolidBackground::new(256, full_range()));
    let called = Arc::new(AtomicBool::new(false));

    for bad in [Value::Null, json!({ "type": "Polygon" }), json!([1, 2])] {
        let flag = called.clone();
        let result = pipeline.render_thumbnail(bad, json!({}), move |_| {
            flag.store(true, Ordering::SeqCst);
        });
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            InputError::MissingGeometry | InputError::MalformedGeometry(_)
        ));
    }

    tokio::task::yield_now().await;
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_non_object_options_fail_synchronously() {
    let pipeline = pipeline_with(SolidBackground::new(256, full_range()));
    let called = Arc::new(AtomicBool::new(false));

    let flag = called.clone();
    let err = pipeline
        .render_thumbnail(geojson(fixtures::POINT_ORIGIN), json!("options"), move |_| {
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap_err();

    assert_eq!(err, InputError::OptionsNotObject("string".to_string()));
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_bad_background_descriptor_reaches_callback() {
    // Real HTTP loader; the descriptor is rejected before any request.
    let pipeline = Arc::new(ThumbnailPipeline::new(PipelineConfig::default()).unwrap());

    let result = render_via_callback(
        &pipeline,
        geojson(fixtures::POINT_ORIGIN),
        json!({ "backgroundTileJSON": { "tiles": [] } }),
    )
    .await;

    assert!(matches!(
        result,
        Err(ThumbnailError::Source(SourceError::InvalidDescriptor(_)))
    ));
}

#[tokio::test]
async fn test_default_background_needs_a_token() {
    let pipeline = Arc::new(ThumbnailPipeline::new(PipelineConfig::default()).unwrap());

    let err = render_via_callback(&pipeline, geojson(fixtures::POINT_ORIGIN), Value::Null)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "SourceError");
}

#[tokio::test]
async fn test_loader_failure_reports_stage() {
    let pipeline = ThumbnailPipeline::builder(PipelineConfig::default())
        .loader(Arc::new(StaticLoader::failing(SourceError::Metadata {
            url: "https://tiles.example/tiles.json".to_string(),
            message: "HTTP 500".to_string(),
        })))
        .build()
        .unwrap();

    let failure = pipeline
        .render_staged(Geometry::point(1.0, 1.0), ThumbnailOptions::default())
        .await
        .unwrap_err();

    assert_eq!(failure.stage, PipelineStage::StylesheetReady);
    assert_eq!(failure.error.kind(), "SourceError");
}

#[tokio::test]
async fn test_option_errors_arrive_through_callback() {
    let pipeline = pipeline_with(SolidBackground::new(256, full_range()));

    for options in [
        json!({ "thumbnailMinZoom": 40 }),
        json!({ "thumbnailMinZoom": 12, "thumbnailMaxZoom": 4 }),
        json!({ "blendFormat": "gif" }),
        json!({ "scale": 0 }),
        json!({ "fetchLimit": -1 }),
    ] {
        let err = render_via_callback(&pipeline, geojson(fixtures::SHORT_LINE), options.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ConfigError", "options {}", options);
    }
}

#[tokio::test]
async fn test_disjoint_zoom_ranges() {
    let pipeline = pipeline_with(SolidBackground::new(256, range(0, 6)));

    let err = render_via_callback(
        &pipeline,
        geojson(fixtures::SHORT_LINE),
        json!({ "thumbnailMinZoom": 10 }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), "ConfigError");
}

#[tokio::test]
async fn test_caller_range_wins_over_suggestion() {
    let pipeline = pipeline_with(SolidBackground::new(256, range(0, 19)));
    let options = ThumbnailOptions::from_json(json!({ "thumbnailMaxZoom": 9 })).unwrap();

    let thumbnail = pipeline
        .render(Geometry::from_geojson(fixtures::SHORT_LINE).unwrap(), options)
        .await
        .unwrap();

    assert_eq!(thumbnail.plan.zoom, 9);
}

#[tokio::test]
async fn test_stylesheet_errors() {
    let pipeline = pipeline_with(SolidBackground::new(256, full_range()));
    let failure = pipeline
        .render_staged(
            Geometry::point(0.0, 0.0),
            ThumbnailOptions {
                stylesheet: Some(r#"{"fill": "{{colour}}"}"#.to_string()),
                ..ThumbnailOptions::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(failure.stage, PipelineStage::Init);
    assert_eq!(failure.error.kind(), "StylesheetError");
}

#[tokio::test]
async fn test_style_variables_change_the_overlay() {
    let pipeline = pipeline_with(SolidBackground::new(256, full_range()));
    let options = ThumbnailOptions::from_json(json!({
        "styleVariables": { "fill": "#00FF00", "fill_opacity": 1.0 }
    }))
    .unwrap();

    let thumbnail = pipeline
        .render(Geometry::from_geojson(fixtures::FEATURE_COLLECTION).unwrap(), options)
        .await
        .unwrap();

    let image = decode_rgba(&thumbnail.image);
    let centre = image.get_pixel(image.width() / 2, image.height() / 2).0;
    assert_eq!(centre, [0, 255, 0, 255]);
}

#[tokio::test]
async fn test_background_fetch_failure_aborts_render() {
    let background = SolidBackground::new(256, full_range()).failing(SourceError::Fetch {
        coord: thumbnail::TileCoord::new(0, 0, 0),
        message: "connection reset".to_string(),
    });
    let pipeline = pipeline_with(background);

    let err = render_via_callback(&pipeline, geojson(fixtures::CONUS_POLYGON), json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ThumbnailError::Source(SourceError::Fetch { .. })));
}

#[tokio::test]
async fn test_overlay_failure_aborts_render() {
    let blender = Arc::new(CountingBlender::default());
    let pipeline = ThumbnailPipeline::builder(PipelineConfig::default())
        .loader(Arc::new(StaticLoader::new(Arc::new(SolidBackground::new(
            256,
            full_range(),
        )))))
        .overlay_factory(Arc::new(FixedOverlayFactory(Arc::new(BrokenOverlay))))
        .blender(blender.clone())
        .build()
        .unwrap();

    let err = pipeline
        .render(Geometry::point(5.0, 5.0), ThumbnailOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ThumbnailError::Source(SourceError::Overlay { .. })));
    assert_eq!(blender.call_count(), 0);
}

#[tokio::test]
async fn test_jpeg_output() {
    let pipeline = pipeline_with(SolidBackground::new(256, full_range()));
    let options = ThumbnailOptions::from_json(json!({ "blendFormat": "jpeg" })).unwrap();

    let thumbnail = pipeline
        .render(Geometry::from_geojson(fixtures::POLYGON_FEATURE).unwrap(), options)
        .await
        .unwrap();

    assert_eq!(thumbnail.headers[CONTENT_TYPE], "image/jpeg");
    assert_eq!(&thumbnail.image[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_invalid_pipeline_config() {
    let config = PipelineConfig {
        stitch_concurrency: 0,
        ..PipelineConfig::default()
    };
    let err = ThumbnailPipeline::new(config).err().unwrap();
    assert_eq!(err.kind(), "ConfigError");
}
