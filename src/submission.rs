//! Comment-collection submission (the entry view).
//!
//! Posts a collection job to the backend and, on success, hands back the
//! identifier to open after a short redirect delay.

use crate::error::{service_message, FetchError, FetchResult};
use crate::identifier;
use crate::models::CollectionReceipt;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Shown when the service rejects the job without saying why.
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to analyze video";
/// Shown when the service cannot be reached.
pub const SUBMIT_UNREACHABLE_MESSAGE: &str = "Something went wrong.";
/// Shown when the input is empty.
pub const SUBMIT_EMPTY_MESSAGE: &str = "Please paste a YouTube video link to analyze.";

#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub base_url: String,
    /// Path segment of `POST /collect/{provider}`.
    pub provider: String,
    pub max_results: u32,
    pub redirect_delay: Duration,
}

#[derive(Debug, Serialize)]
struct CollectRequest<'a> {
    url: &'a str,
    max_results: u32,
}

/// Where to go after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub navigate_to: String,
    pub count: u64,
    pub status: String,
    redirect_delay: Duration,
}

impl Navigation {
    /// Hold the status on screen for the redirect delay, then yield the
    /// identifier to open.
    pub async fn follow(self) -> String {
        tokio::time::sleep(self.redirect_delay).await;
        self.navigate_to
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionController {
    http_client: reqwest::Client,
    config: SubmissionConfig,
}

impl SubmissionController {
    pub fn new(http_client: reqwest::Client, config: SubmissionConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Submit a link (or bare id) for collection.
    ///
    /// `on_status` receives transient status text. Empty input fails with
    /// `InputInvalid` before any request is made. The redirect delay is
    /// applied by [`Navigation::follow`], not here.
    pub async fn submit<F>(&self, raw: &str, mut on_status: F) -> FetchResult<Navigation>
    where
        F: FnMut(&str),
    {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FetchError::InputInvalid);
        }

        on_status("Analyzing video...");
        let receipt = self.post_collect(&identifier::to_watch_url(raw)).await?;

        let status = format!("Fetched {} comments. Redirecting...", receipt.count);
        on_status(&status);

        Ok(Navigation {
            navigate_to: receipt.video_id,
            count: receipt.count,
            status,
            redirect_delay: self.config.redirect_delay,
        })
    }

    async fn post_collect(&self, url: &str) -> FetchResult<CollectionReceipt> {
        let endpoint = format!(
            "{}/collect/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.provider
        );
        info!("Submitting collection job for {}", url);

        let response = self
            .http_client
            .post(&endpoint)
            .json(&CollectRequest {
                url,
                max_results: self.config.max_results,
            })
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = service_message(&body, SUBMIT_FALLBACK_MESSAGE);
            warn!("Collection service returned {}: {}", status, message);
            return Err(FetchError::Service(message));
        }

        let receipt: CollectionReceipt =
            response.json().await.map_err(FetchError::from_transport)?;
        info!(
            "Collected {} comments for {} ({})",
            receipt.count, receipt.video_id, receipt.message
        );
        Ok(receipt)
    }
}

/// User-facing text for a failed submission.
pub fn failure_message(err: &FetchError) -> String {
    match err {
        FetchError::InputInvalid => SUBMIT_EMPTY_MESSAGE.to_string(),
        FetchError::Unreachable(_) => SUBMIT_UNREACHABLE_MESSAGE.to_string(),
        other => other.to_string(),
    }
}
