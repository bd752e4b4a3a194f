//! Analysis retrieval from the sentiment service.

use crate::error::{service_message, FetchError, FetchResult};
use crate::models::AnalysisResult;
use reqwest::Url;
use tracing::{debug, info, warn};

/// Message shown when the service fails without saying why.
pub const ANALYSIS_FALLBACK_MESSAGE: &str = "Failed to analyze comments.";

/// Fetches `GET {base_url}/course/{id}/analysis`. Every call is one attempt;
/// there is no retry.
#[derive(Debug, Clone)]
pub struct AnalysisFetcher {
    http_client: reqwest::Client,
    base_url: String,
}

impl AnalysisFetcher {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// `{base_url}/course/{identifier}/analysis` with the identifier encoded
    /// as a single path segment.
    fn analysis_url(&self, identifier: &str) -> FetchResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Unreachable(format!("invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Unreachable(format!("invalid backend URL: {}", self.base_url)))?
            .pop_if_empty()
            .push("course")
            .push(identifier)
            .push("analysis");
        Ok(url)
    }

    pub async fn fetch(&self, identifier: &str) -> FetchResult<AnalysisResult> {
        let url = self.analysis_url(identifier)?;
        info!("Requesting analysis for {}", identifier);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = service_message(&body, ANALYSIS_FALLBACK_MESSAGE);
            warn!("Analysis service returned {}: {}", status, message);
            return Err(FetchError::Service(message));
        }

        let result: AnalysisResult = response.json().await.map_err(FetchError::from_transport)?;
        debug!(
            "Analysis for {}: {} comments, {} categories, {} aspects",
            identifier,
            result.raw_count,
            result.review.categories.len(),
            result.aspect_list.len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OverallSentiment;
    use httpmock::prelude::*;
    use serde_json::json;

    fn fetcher(server: &MockServer) -> AnalysisFetcher {
        AnalysisFetcher::new(reqwest::Client::new(), server.base_url())
    }

    #[tokio::test]
    async fn fetch_decodes_analysis() {
        let server = MockServer::start_async().await;
        let analysis = server.mock(|when, then| {
            when.method(GET).path("/course/abc/analysis");
            then.status(200).json_body(json!({
                "course_id": "abc",
                "raw_count": 3,
                "aggregate": {
                    "overall_sentiment": "negative",
                    "adjusted_score": 1.2,
                    "scaled_score": 3.4
                },
                "review": { "summary": "Too fast.", "categories": {} },
                "aspect_list": []
            }));
        });

        let result = fetcher(&server).fetch("abc").await.unwrap();

        assert_eq!(result.raw_count, 3);
        assert_eq!(result.aggregate.overall_sentiment, OverallSentiment::Negative);
        assert_eq!(result.review.summary, "Too fast.");
        analysis.assert_calls(1);
    }

    #[test]
    fn analysis_url_encodes_identifier_as_one_segment() {
        let fetcher = AnalysisFetcher::new(reqwest::Client::new(), "http://127.0.0.1:5000/");

        let url = fetcher.analysis_url("abc#x").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/course/abc%23x/analysis");

        let url = fetcher.analysis_url("a/b?c").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/course/a%2Fb%3Fc/analysis");
    }

    #[test]
    fn analysis_url_keeps_base_path() {
        let fetcher = AnalysisFetcher::new(reqwest::Client::new(), "http://host/api");

        let url = fetcher.analysis_url("abc").unwrap();
        assert_eq!(url.as_str(), "http://host/api/course/abc/analysis");
    }

    #[tokio::test]
    async fn fetch_does_not_leak_into_another_course() {
        let server = MockServer::start_async().await;
        let other_course = server.mock(|when, then| {
            when.method(GET).path("/course/abc");
            then.status(200).json_body(json!({ "raw_count": 7 }));
        });

        let result = fetcher(&server).fetch("abc#x").await;

        assert!(result.is_err());
        other_course.assert_calls(0);
    }

    #[tokio::test]
    async fn fetch_rejects_unparseable_base_url() {
        let fetcher = AnalysisFetcher::new(reqwest::Client::new(), "not a url");

        let err = fetcher.fetch("abc").await.unwrap_err();

        assert!(matches!(err, FetchError::Unreachable(_)));
    }

    #[tokio::test]
    async fn fetch_uses_service_error_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/course/abc/analysis");
            then.status(500).json_body(json!({ "error": "model not loaded" }));
        });

        let err = fetcher(&server).fetch("abc").await.unwrap_err();

        assert_eq!(err, FetchError::Service("model not loaded".to_string()));
    }

    #[tokio::test]
    async fn fetch_falls_back_to_generic_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/course/abc/analysis");
            then.status(502).body("Bad Gateway");
        });

        let err = fetcher(&server).fetch("abc").await.unwrap_err();

        assert_eq!(err, FetchError::Service(ANALYSIS_FALLBACK_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn fetch_invalid_json_is_unreachable() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/course/abc/analysis");
            then.status(200).body("not json");
        });

        let err = fetcher(&server).fetch("abc").await.unwrap_err();

        assert!(matches!(err, FetchError::Unreachable(_)));
    }

    #[tokio::test]
    async fn fetch_connection_refused_is_unreachable() {
        let fetcher = AnalysisFetcher::new(reqwest::Client::new(), "http://127.0.0.1:9");

        let err = fetcher.fetch("abc").await.unwrap_err();

        assert!(matches!(err, FetchError::Unreachable(_)));
    }
}
