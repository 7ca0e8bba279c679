//! Blend adapter: composites overlay tiles onto background tiles.

use async_trait::async_trait;
use bytes::Bytes;
use renderer::{blend_tiles, ImageFormat};
use thumbnail_common::{ThumbnailError, ThumbnailResult};

/// Alpha-composites two encoded tiles of equal size.
#[async_trait]
pub trait Blender: Send + Sync {
    async fn blend(
        &self,
        background: Bytes,
        overlay: Bytes,
        format: ImageFormat,
    ) -> ThumbnailResult<Bytes>;
}

/// Source-over compositing with the `image` crate, off the async threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBlender;

#[async_trait]
impl Blender for ImageBlender {
    async fn blend(
        &self,
        background: Bytes,
        overlay: Bytes,
        format: ImageFormat,
    ) -> ThumbnailResult<Bytes> {
        let blended =
            tokio::task::spawn_blocking(move || blend_tiles(&background, &overlay, format))
                .await
                .map_err(|e| ThumbnailError::Compositing(format!("blend task failed: {}", e)))?;

        blended
            .map(Bytes::from)
            .map_err(|e| ThumbnailError::Compositing(e.to_string()))
    }
}
