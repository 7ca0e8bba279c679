//! HTTP-backed background sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thumbnail_common::{SourceError, TileCoord, ZoomRange};
use tracing::{debug, info, instrument};

use super::tilejson::TileJson;
use super::{BackgroundDescriptor, BackgroundLoader, BackgroundSource};

/// Fetches tiles described by a TileJSON document.
pub struct HttpTileSource {
    client: Client,
    tilejson: TileJson,
    zoom_range: ZoomRange,
}

impl HttpTileSource {
    pub fn new(client: Client, tilejson: TileJson) -> Result<Self, SourceError> {
        let zoom_range = tilejson.validate()?;
        Ok(Self {
            client,
            tilejson,
            zoom_range,
        })
    }

    pub fn tilejson(&self) -> &TileJson {
        &self.tilejson
    }
}

#[async_trait]
impl BackgroundSource for HttpTileSource {
    fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    fn tile_size(&self) -> u32 {
        self.tilejson.tile_size
    }

    #[instrument(skip(self), fields(tile = %coord))]
    async fn fetch_tile(&self, coord: TileCoord) -> Result<Bytes, SourceError> {
        if !self.zoom_range.contains(coord.z) {
            return Err(SourceError::ZoomOutOfRange {
                zoom: coord.z,
                min: self.zoom_range.min,
                max: self.zoom_range.max,
            });
        }

        let fetch_err = |message: String| SourceError::Fetch { coord, message };
        let url = self
            .tilejson
            .tile_url(&coord)
            .ok_or_else(|| fetch_err("no tile URL template".to_string()))?;

        debug!("Fetching background tile");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }

        let bytes = response.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
        debug!(size = bytes.len(), "Fetched background tile");
        Ok(bytes)
    }
}

/// Loads presets, TileJSON URLs and embedded TileJSON into [`HttpTileSource`]s.
pub struct HttpBackgroundLoader {
    client: Client,
    access_token: Option<String>,
}

impl HttpBackgroundLoader {
    pub fn new(timeout: Duration, access_token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("geojson-thumbnail/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, access_token))
    }

    pub fn with_client(client: Client, access_token: Option<String>) -> Self {
        Self {
            client,
            access_token,
        }
    }

    /// Resolve a descriptor into TileJSON without creating a source.
    pub async fn resolve(&self, descriptor: &BackgroundDescriptor) -> Result<TileJson, SourceError> {
        match descriptor {
            BackgroundDescriptor::Preset { preset } => {
                preset.tilejson(self.access_token.as_deref())
            }
            BackgroundDescriptor::TileJson(value) => TileJson::from_value(value.clone()),
            BackgroundDescriptor::Url(url) => self.fetch_tilejson(url).await,
        }
    }

    #[instrument(skip(self))]
    async fn fetch_tilejson(&self, url: &str) -> Result<TileJson, SourceError> {
        let metadata_err = |message: String| SourceError::Metadata {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| metadata_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(metadata_err(format!("HTTP {}", response.status())));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| metadata_err(format!("invalid JSON: {}", e)))?;
        TileJson::from_value(value).map_err(|e| metadata_err(e.to_string()))
    }
}

#[async_trait]
impl BackgroundLoader for HttpBackgroundLoader {
    async fn load(
        &self,
        descriptor: &BackgroundDescriptor,
    ) -> Result<Arc<dyn BackgroundSource>, SourceError> {
        let tilejson = self.resolve(descriptor).await?;
        let source = HttpTileSource::new(self.client.clone(), tilejson)?;

        info!(
            name = source.tilejson().name.as_deref().unwrap_or("unnamed"),
            zoom_range = %source.zoom_range(),
            tile_size = source.tile_size(),
            "Loaded background source"
        );
        Ok(Arc::new(source))
    }
}

impl Default for HttpBackgroundLoader {
    fn default() -> Self {
        Self::with_client(Client::new(), None)
    }
}
