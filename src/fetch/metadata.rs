//! Video metadata lookup against the YouTube Data API.

use crate::error::{FetchError, FetchResult};
use crate::models::{Statistic, VideoMetadata};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Provider settings injected at construction.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    /// Base URL of the video API, e.g. `https://www.googleapis.com/youtube/v3`.
    pub api_url: String,
    /// Access key sent as the `key` query parameter.
    pub api_key: String,
}

/// `videos.list` response. Only the fields the page shows are decoded.
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Thumbnail,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default)]
    like_count: Option<Value>,
    #[serde(default)]
    view_count: Option<Value>,
}

impl From<VideoItem> for VideoMetadata {
    fn from(item: VideoItem) -> Self {
        Self {
            title: item.snippet.title,
            channel: item.snippet.channel_title,
            thumbnail_url: item.snippet.thumbnails.high.url,
            likes: Statistic::from_raw(item.statistics.like_count.as_ref()),
            views: Statistic::from_raw(item.statistics.view_count.as_ref()),
        }
    }
}

/// Single-shot metadata fetcher.
#[derive(Debug, Clone)]
pub struct VideoMetadataFetcher {
    http_client: reqwest::Client,
    config: MetadataConfig,
}

impl VideoMetadataFetcher {
    pub fn new(http_client: reqwest::Client, config: MetadataConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Fetch metadata for `identifier` with exactly one provider request.
    /// Only the first returned item is used.
    pub async fn fetch(&self, identifier: &str) -> FetchResult<VideoMetadata> {
        let url = format!("{}/videos", self.config.api_url.trim_end_matches('/'));
        info!("Fetching video metadata for {}", identifier);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("part", "snippet,statistics"),
                ("id", identifier),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Video provider returned {} for {}", status, identifier);
            debug!("Provider error body: {}", body);
            return Err(FetchError::Unreachable(format!(
                "video provider returned {}",
                status
            )));
        }

        let list: VideoListResponse = response.json().await.map_err(FetchError::from_transport)?;
        debug!("Provider returned {} item(s)", list.items.len());

        list.items
            .into_iter()
            .next()
            .map(VideoMetadata::from)
            .ok_or(FetchError::NotFound)
    }
}
