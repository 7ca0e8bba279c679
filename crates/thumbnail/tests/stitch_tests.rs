//! Stitching through the mosaic stitcher.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use test_utils::{decode_rgba, solid_tile};
use thumbnail::stitch::{CONTENT_TYPE, TILE_COUNT};
use thumbnail::{
    BoundingBox, ImageFormat, MosaicStitcher, RenderRequestBuilder, SourceError, Stitcher,
    ThumbnailError, ThumbnailResult, TileCoord, TileFetcher, MAX_CANVAS_PIXELS,
};

/// Serves solid tiles and remembers what was asked for.
struct RecordingFetcher {
    tile: Bytes,
    fail_at: Option<TileCoord>,
    calls: AtomicU64,
    seen: Mutex<HashSet<TileCoord>>,
}

impl RecordingFetcher {
    fn new(tile_size: u32) -> Self {
        Self {
            tile: Bytes::from(solid_tile(tile_size, common::BLUE)),
            fail_at: None,
            calls: AtomicU64::new(0),
            seen: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl TileFetcher for RecordingFetcher {
    async fn fetch_tile(&self, coord: TileCoord) -> ThumbnailResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().insert(coord);
        if self.fail_at == Some(coord) {
            return Err(SourceError::Fetch {
                coord,
                message: "HTTP 404".to_string(),
            }
            .into());
        }
        Ok(self.tile.clone())
    }
}

#[tokio::test]
async fn test_point_mosaic() {
    let fetcher = Arc::new(RecordingFetcher::new(256));
    // 256 px on each side of the origin at zoom 4 is exactly 2x2 tiles.
    let pad = 256.0 * 360.0 / 4096.0;
    let request = RenderRequestBuilder::new(fetcher.clone())
        .zoom(4)
        .bbox(BoundingBox::new(-pad, -10.0, pad, 10.0))
        .build()
        .unwrap();

    let stitched = MosaicStitcher::default().assemble(request).await.unwrap();

    assert_eq!(stitched.headers[CONTENT_TYPE], "image/png");
    assert_eq!(stitched.headers[TILE_COUNT], "4");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);

    let image = decode_rgba(&stitched.image);
    assert_eq!(image.width(), 512);
    assert_eq!(image.get_pixel(5, 5).0, common::BLUE);
    assert_eq!(image.get_pixel(506, image.height() - 5).0, common::BLUE);
}

#[tokio::test]
async fn test_fetch_limit_rejects_before_fetching() {
    let fetcher = Arc::new(RecordingFetcher::new(256));
    let request = RenderRequestBuilder::new(fetcher.clone())
        .zoom(10)
        .bbox(BoundingBox::new(-125.0, 25.0, -65.0, 50.0))
        .fetch_limit(100)
        .build()
        .unwrap();

    let err = MosaicStitcher::default().assemble(request).await.unwrap_err();

    assert_eq!(err.kind(), "StitchingError");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_canvas_rejects_before_fetching() {
    // Four tiles, but a scale of 100 asks for a canvas far past the ceiling.
    let fetcher = Arc::new(RecordingFetcher::new(256));
    let pad = 256.0 * 360.0 / 4096.0;
    let request = RenderRequestBuilder::new(fetcher.clone())
        .zoom(4)
        .bbox(BoundingBox::new(-pad, -10.0, pad, 10.0))
        .scale(100.0)
        .build()
        .unwrap();

    let err = MosaicStitcher::default().assemble(request).await.unwrap_err();

    assert_eq!(err.kind(), "StitchingError");
    assert!(err.to_string().contains(&MAX_CANVAS_PIXELS.to_string()), "{}", err);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_one_failed_tile_fails_the_stitch() {
    let fetcher = Arc::new(RecordingFetcher {
        fail_at: Some(TileCoord::new(2, 1, 1)),
        ..RecordingFetcher::new(256)
    });
    let request = RenderRequestBuilder::new(fetcher)
        .zoom(2)
        .bbox(BoundingBox::new(-170.0, -60.0, 170.0, 60.0))
        .build()
        .unwrap();

    let err = MosaicStitcher::new(2).assemble(request).await.unwrap_err();

    assert!(matches!(
        err,
        ThumbnailError::Source(SourceError::Fetch { coord, .. }) if coord == TileCoord::new(2, 1, 1)
    ));
}

#[tokio::test]
async fn test_antimeridian_columns_wrap() {
    let fetcher = Arc::new(RecordingFetcher::new(256));
    let request = RenderRequestBuilder::new(fetcher.clone())
        .zoom(3)
        .bbox(BoundingBox::new(170.0, -5.0, 190.0, 5.0))
        .build()
        .unwrap();

    MosaicStitcher::default().assemble(request).await.unwrap();

    let seen = fetcher.seen.lock().unwrap();
    let columns: HashSet<u32> = seen.iter().map(|c| c.x).collect();
    assert_eq!(columns, HashSet::from([7, 0]));
}

#[tokio::test]
async fn test_scale_and_jpeg_output() {
    let fetcher = Arc::new(RecordingFetcher::new(256));
    let pad = 128.0 * 360.0 / 2048.0;
    let request = RenderRequestBuilder::new(fetcher)
        .zoom(3)
        .bbox(BoundingBox::new(-pad, -5.0, pad, 5.0))
        .scale(2.0)
        .format(ImageFormat::Jpeg)
        .build()
        .unwrap();

    let stitched = MosaicStitcher::default().assemble(request).await.unwrap();

    assert_eq!(stitched.headers[CONTENT_TYPE], "image/jpeg");
    assert_eq!(&stitched.image[..2], &[0xFF, 0xD8]);
    assert_eq!(decode_rgba(&stitched.image).width(), 512);
}
