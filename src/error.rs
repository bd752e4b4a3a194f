//! Failure taxonomy shared by every fetcher.
//!
//! None of these escape as process errors: controllers fold them into
//! page-visible state with a short message.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No usable identifier; no request was issued.
    #[error("No video to show. Please go back and enter a valid YouTube URL.")]
    InputInvalid,

    /// The provider answered but had no matching item.
    #[error("No video found for this ID.")]
    NotFound,

    /// Transport failure or an undecodable payload.
    #[error("Request failed: {0}")]
    Unreachable(String),

    /// Non-2xx response with the service-supplied (or fallback) message.
    #[error("{0}")]
    Service(String),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// Classify a reqwest error. Decode failures and transport failures are
    /// both `Unreachable`; only the detail differs.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Unreachable("request timed out".to_string())
        } else if err.is_connect() {
            FetchError::Unreachable("connection refused".to_string())
        } else if err.is_decode() {
            FetchError::Unreachable(format!("invalid response body: {}", err))
        } else {
            FetchError::Unreachable(err.to_string())
        }
    }

    /// Short label used in JSON snapshots and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InputInvalid => "input_invalid",
            FetchError::NotFound => "not_found",
            FetchError::Unreachable(_) => "unreachable",
            FetchError::Service(_) => "service_error",
        }
    }
}

/// Body shape of every non-2xx answer from the collection/analysis service.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ServiceErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Pull the service's `error` field out of a failed response body, falling
/// back to `fallback` when it is missing, blank, or the body is not JSON.
pub(crate) fn service_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ServiceErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FetchError::NotFound.to_string(),
            "No video found for this ID."
        );
        assert!(FetchError::InputInvalid
            .to_string()
            .starts_with("No video to show"));
        assert_eq!(FetchError::Service("boom".into()).to_string(), "boom");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(FetchError::InputInvalid.kind(), "input_invalid");
        assert_eq!(FetchError::Unreachable("x".into()).kind(), "unreachable");
        assert_eq!(FetchError::Service("x".into()).kind(), "service_error");
    }

    #[test]
    fn test_service_message_prefers_body() {
        assert_eq!(
            service_message(r#"{"error": "YouTube URL is required"}"#, "fallback"),
            "YouTube URL is required"
        );
    }

    #[test]
    fn test_service_message_fallbacks() {
        assert_eq!(service_message("<html>oops</html>", "fallback"), "fallback");
        assert_eq!(service_message(r#"{"status": "bad"}"#, "fallback"), "fallback");
        assert_eq!(service_message(r#"{"error": "  "}"#, "fallback"), "fallback");
    }
}
