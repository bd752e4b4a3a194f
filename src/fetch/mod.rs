//! HTTP fetchers for the two data sources of the analysis page.

pub mod analysis;
pub mod metadata;

pub use analysis::AnalysisFetcher;
pub use metadata::{MetadataConfig, VideoMetadataFetcher};

use anyhow::{Context, Result};
use std::time::Duration;

/// Build the shared HTTP client used by every fetcher.
pub fn http_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("vidpulse/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}
