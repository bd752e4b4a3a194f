//! State machine behind the analysis page.
//!
//! The controller never performs I/O. Navigation and user actions return a
//! [`Command`] describing the fetch to issue; the caller runs it and feeds the
//! outcome back through [`AnalysisPageController::metadata_settled`] or
//! [`AnalysisPageController::analysis_settled`]. Every command carries a
//! [`RequestTag`] so completions for a page view that is gone are dropped.

use crate::analysis::aggregate_categories;
use crate::error::FetchError;
use crate::identifier;
use crate::models::{AnalysisResult, VideoMetadata, VisualizationRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Shown when a metadata request cannot be completed.
pub const METADATA_UNREACHABLE_MESSAGE: &str = "Failed to fetch video info.";
/// Shown when an analysis request cannot be completed.
pub const ANALYSIS_UNREACHABLE_MESSAGE: &str = "Error analyzing video. Please try again.";

static INVALID_INPUT: FetchError = FetchError::InputInvalid;

/// Identifies the page view a request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag {
    pub identifier: String,
    /// Bumped on every identifier change, so A -> B -> A still drops
    /// responses from the first A.
    pub generation: u64,
}

/// A fetch the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchMetadata(RequestTag),
    FetchAnalysis(RequestTag),
}

/// Visible state of the page. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    Invalid,
    LoadingMetadata,
    MetadataError,
    Ready,
    AnalyzingInFlight,
    AnalysisReady,
    AnalysisError,
}

/// A successful analysis with its chart records, derived once on arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAnalysis {
    pub result: AnalysisResult,
    pub records: Vec<VisualizationRecord>,
    pub received_at: DateTime<Utc>,
}

impl LoadedAnalysis {
    fn new(result: AnalysisResult) -> Self {
        let records = aggregate_categories(Some(&result.review.categories));
        Self {
            result,
            records,
            received_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MetadataSlot {
    Loading,
    Loaded(VideoMetadata),
    Failed(FetchError),
}

#[derive(Debug, Clone, Default)]
struct AnalysisSlot {
    in_flight: Option<RequestTag>,
    latest: Option<LoadedAnalysis>,
    last_error: Option<FetchError>,
}

/// Drives one analysis page: metadata loads on navigation, analysis loads on
/// explicit request.
#[derive(Debug, Default)]
pub struct AnalysisPageController {
    mounted: bool,
    identifier: Option<String>,
    generation: u64,
    metadata: Option<MetadataSlot>,
    analysis: AnalysisSlot,
    aspects_expanded: bool,
}

impl AnalysisPageController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the page or change its identifier segment.
    ///
    /// Returns the metadata fetch to issue, if any. Re-navigating to the
    /// current identifier does nothing.
    pub fn navigate(&mut self, segment: Option<&str>) -> Option<Command> {
        let next = identifier::normalize(segment);
        if self.mounted && next == self.identifier {
            debug!("Identifier unchanged; no refetch");
            return None;
        }

        self.mounted = true;
        self.generation += 1;
        self.identifier = next;
        self.analysis = AnalysisSlot::default();
        self.aspects_expanded = false;

        match &self.identifier {
            Some(id) => {
                info!("Loading page for {}", id);
                self.metadata = Some(MetadataSlot::Loading);
                Some(Command::FetchMetadata(self.tag(id)))
            }
            None => {
                info!("No usable identifier; page is invalid");
                self.metadata = None;
                None
            }
        }
    }

    /// The "Get Review" action. Suppressed while an analysis is in flight or
    /// when there is no identifier.
    pub fn request_review(&mut self) -> Option<Command> {
        let Some(id) = self.identifier.clone() else {
            debug!("Review requested without an identifier");
            return None;
        };

        if self.analysis.in_flight.is_some() {
            debug!("Analysis already in flight for {}; ignoring", id);
            return None;
        }

        let tag = self.tag(&id);
        self.analysis.in_flight = Some(tag.clone());
        Some(Command::FetchAnalysis(tag))
    }

    /// Apply a metadata outcome. Returns false when the response was stale.
    pub fn metadata_settled(
        &mut self,
        tag: &RequestTag,
        outcome: Result<VideoMetadata, FetchError>,
    ) -> bool {
        if !self.is_current(tag) || self.metadata != Some(MetadataSlot::Loading) {
            warn!("Dropping stale metadata response for {}", tag.identifier);
            return false;
        }

        self.metadata = Some(match outcome {
            Ok(metadata) => MetadataSlot::Loaded(metadata),
            Err(err) => {
                warn!("Metadata for {} failed: {}", tag.identifier, err);
                MetadataSlot::Failed(err)
            }
        });
        true
    }

    /// Apply an analysis outcome. Returns false when the response was stale.
    ///
    /// A failure keeps the last successful analysis; only navigation
    /// discards it.
    pub fn analysis_settled(
        &mut self,
        tag: &RequestTag,
        outcome: Result<AnalysisResult, FetchError>,
    ) -> bool {
        if self.analysis.in_flight.as_ref() != Some(tag) {
            warn!("Dropping stale analysis response for {}", tag.identifier);
            return false;
        }
        self.analysis.in_flight = None;

        match outcome {
            Ok(result) => {
                let loaded = LoadedAnalysis::new(result);
                info!(
                    "Analysis ready for {} ({} categories)",
                    tag.identifier,
                    loaded.records.len()
                );
                self.analysis.latest = Some(loaded);
                self.analysis.last_error = None;
            }
            Err(err) => {
                warn!("Analysis for {} failed: {}", tag.identifier, err);
                self.analysis.last_error = Some(err);
            }
        }
        true
    }

    pub fn toggle_aspects(&mut self) {
        self.aspects_expanded = !self.aspects_expanded;
    }

    pub fn state(&self) -> PageState {
        if self.identifier.is_none() {
            return PageState::Invalid;
        }

        match &self.metadata {
            Some(MetadataSlot::Loading) | None => PageState::LoadingMetadata,
            Some(MetadataSlot::Failed(_)) => PageState::MetadataError,
            Some(MetadataSlot::Loaded(_)) => self.analysis_state(),
        }
    }

    /// Analysis-side state, independent of how metadata fared.
    pub fn analysis_state(&self) -> PageState {
        if self.identifier.is_none() {
            PageState::Invalid
        } else if self.analysis.in_flight.is_some() {
            PageState::AnalyzingInFlight
        } else if self.analysis.last_error.is_some() {
            PageState::AnalysisError
        } else if self.analysis.latest.is_some() {
            PageState::AnalysisReady
        } else {
            PageState::Ready
        }
    }

    /// Human-readable message for the current error state, if any.
    pub fn message(&self) -> Option<String> {
        match self.state() {
            PageState::Invalid => Some(FetchError::InputInvalid.to_string()),
            PageState::MetadataError => self.metadata_error().map(metadata_message),
            _ => self.analysis_message(),
        }
    }

    /// Message for a failed analysis attempt, regardless of metadata state.
    pub fn analysis_message(&self) -> Option<String> {
        self.analysis.last_error.as_ref().map(analysis_message)
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        match &self.metadata {
            Some(MetadataSlot::Loaded(metadata)) => Some(metadata),
            _ => None,
        }
    }

    pub fn metadata_error(&self) -> Option<&FetchError> {
        match &self.metadata {
            Some(MetadataSlot::Failed(err)) => Some(err),
            _ => None,
        }
    }

    /// The failure behind the current error state, if any.
    pub fn error(&self) -> Option<&FetchError> {
        match self.state() {
            PageState::Invalid => Some(&INVALID_INPUT),
            PageState::MetadataError => self.metadata_error(),
            _ => self.analysis.last_error.as_ref(),
        }
    }

    pub fn analysis(&self) -> Option<&LoadedAnalysis> {
        self.analysis.latest.as_ref()
    }

    pub fn records(&self) -> &[VisualizationRecord] {
        self.analysis
            .latest
            .as_ref()
            .map(|a| a.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn aspects_expanded(&self) -> bool {
        self.aspects_expanded
    }

    /// Whether "Get Review" is currently enabled. A metadata failure does
    /// not disable it.
    pub fn review_enabled(&self) -> bool {
        self.identifier.is_some() && self.analysis.in_flight.is_none()
    }

    pub fn analysis_in_flight(&self) -> bool {
        self.analysis.in_flight.is_some()
    }

    /// True while any fetch for the current page view is outstanding.
    pub fn has_pending(&self) -> bool {
        self.metadata == Some(MetadataSlot::Loading) || self.analysis.in_flight.is_some()
    }

    fn tag(&self, identifier: &str) -> RequestTag {
        RequestTag {
            identifier: identifier.to_string(),
            generation: self.generation,
        }
    }

    fn is_current(&self, tag: &RequestTag) -> bool {
        tag.generation == self.generation && self.identifier.as_deref() == Some(&tag.identifier)
    }
}

fn metadata_message(err: &FetchError) -> String {
    match err {
        FetchError::Unreachable(_) => METADATA_UNREACHABLE_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

fn analysis_message(err: &FetchError) -> String {
    match err {
        FetchError::Unreachable(_) => ANALYSIS_UNREACHABLE_MESSAGE.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Statistic;
    use serde_json::json;

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            title: "Intro to Rust".to_string(),
            channel: "Rustacean Station".to_string(),
            thumbnail_url: "https://i.ytimg.com/vi/abc/hqdefault.jpg".to_string(),
            likes: Statistic::Count(10),
            views: Statistic::Unavailable,
        }
    }

    fn analysis() -> AnalysisResult {
        serde_json::from_value(json!({
            "raw_count": 2,
            "aggregate": {
                "overall_sentiment": "positive",
                "adjusted_score": 8.5,
                "scaled_score": 9.0
            },
            "review": {
                "summary": "Great course.",
                "categories": {
                    "pacing": { "score": 0.8, "count": 3 },
                    "clarity": { "score": -0.2, "count": 1 }
                }
            },
            "aspect_list": []
        }))
        .unwrap()
    }

    fn expect_metadata(command: Option<Command>) -> RequestTag {
        match command {
            Some(Command::FetchMetadata(tag)) => tag,
            other => panic!("expected metadata fetch, got {:?}", other),
        }
    }

    fn expect_analysis(command: Option<Command>) -> RequestTag {
        match command {
            Some(Command::FetchAnalysis(tag)) => tag,
            other => panic!("expected analysis fetch, got {:?}", other),
        }
    }

    fn ready_page(id: &str) -> AnalysisPageController {
        let mut page = AnalysisPageController::new();
        let tag = expect_metadata(page.navigate(Some(id)));
        assert!(page.metadata_settled(&tag, Ok(metadata())));
        page
    }

    #[test]
    fn test_empty_identifier_is_invalid() {
        let mut page = AnalysisPageController::new();

        assert_eq!(page.navigate(Some("")), None);
        assert_eq!(page.state(), PageState::Invalid);
        assert!(page.message().unwrap().starts_with("No video to show"));
        assert!(!page.review_enabled());
        assert_eq!(page.request_review(), None);
    }

    #[test]
    fn test_sentinel_and_absent_are_invalid() {
        let mut page = AnalysisPageController::new();
        assert_eq!(page.navigate(Some("nothing")), None);
        assert_eq!(page.state(), PageState::Invalid);

        let mut page = AnalysisPageController::new();
        assert_eq!(page.navigate(None), None);
        assert_eq!(page.state(), PageState::Invalid);
    }

    #[test]
    fn test_metadata_lifecycle() {
        let mut page = AnalysisPageController::new();
        let tag = expect_metadata(page.navigate(Some("abc")));

        assert_eq!(tag.identifier, "abc");
        assert_eq!(page.state(), PageState::LoadingMetadata);
        assert!(page.has_pending());

        assert!(page.metadata_settled(&tag, Ok(metadata())));
        assert_eq!(page.state(), PageState::Ready);
        assert_eq!(page.metadata().unwrap().title, "Intro to Rust");
        assert!(!page.has_pending());
        assert_eq!(page.message(), None);
    }

    #[test]
    fn test_not_found_metadata() {
        let mut page = AnalysisPageController::new();
        let tag = expect_metadata(page.navigate(Some("abc")));

        page.metadata_settled(&tag, Err(FetchError::NotFound));

        assert_eq!(page.state(), PageState::MetadataError);
        assert_eq!(page.message().as_deref(), Some("No video found for this ID."));
    }

    #[test]
    fn test_unreachable_metadata_message() {
        let mut page = AnalysisPageController::new();
        let tag = expect_metadata(page.navigate(Some("abc")));

        page.metadata_settled(&tag, Err(FetchError::Unreachable("timeout".into())));

        assert_eq!(page.message().as_deref(), Some(METADATA_UNREACHABLE_MESSAGE));
    }

    #[test]
    fn test_same_identifier_does_not_refetch() {
        let mut page = ready_page("abc");

        assert_eq!(page.navigate(Some("abc")), None);
        assert_eq!(page.navigate(Some("https://youtu.be/abc")), None);
        assert_eq!(page.state(), PageState::Ready);
    }

    #[test]
    fn test_analysis_success_derives_records() {
        let mut page = ready_page("abc");
        let tag = expect_analysis(page.request_review());

        assert_eq!(page.state(), PageState::AnalyzingInFlight);
        assert!(!page.review_enabled());

        assert!(page.analysis_settled(&tag, Ok(analysis())));
        assert_eq!(page.state(), PageState::AnalysisReady);
        let records = page.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "pacing");
        assert!((records[0].value - 2.4).abs() < 1e-9);
        assert_eq!(records[1].name, "clarity");
        assert!(page.review_enabled());
    }

    #[test]
    fn test_second_trigger_while_in_flight_is_suppressed() {
        let mut page = ready_page("abc");

        assert!(page.request_review().is_some());
        assert_eq!(page.request_review(), None);
        assert_eq!(page.request_review(), None);
    }

    #[test]
    fn test_analysis_error_then_retry() {
        let mut page = ready_page("abc");
        let tag = expect_analysis(page.request_review());

        page.analysis_settled(&tag, Err(FetchError::Service("model not loaded".into())));
        assert_eq!(page.state(), PageState::AnalysisError);
        assert_eq!(page.error().map(FetchError::kind), Some("service_error"));
        assert_eq!(page.message().as_deref(), Some("model not loaded"));

        let retry = expect_analysis(page.request_review());
        assert_eq!(page.state(), PageState::AnalyzingInFlight);
        page.analysis_settled(&retry, Ok(analysis()));
        assert_eq!(page.state(), PageState::AnalysisReady);
        assert_eq!(page.message(), None);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_result() {
        let mut page = ready_page("abc");
        let first = expect_analysis(page.request_review());
        page.analysis_settled(&first, Ok(analysis()));

        let second = expect_analysis(page.request_review());
        page.analysis_settled(&second, Err(FetchError::Unreachable("reset".into())));

        assert_eq!(page.state(), PageState::AnalysisError);
        assert_eq!(page.message().as_deref(), Some(ANALYSIS_UNREACHABLE_MESSAGE));
        assert!(page.analysis().is_some());
    }

    #[test]
    fn test_identifier_change_discards_analysis() {
        let mut page = ready_page("abc");
        let tag = expect_analysis(page.request_review());
        page.analysis_settled(&tag, Ok(analysis()));
        page.toggle_aspects();

        let next = expect_metadata(page.navigate(Some("xyz")));

        assert_eq!(next.identifier, "xyz");
        assert_eq!(page.state(), PageState::LoadingMetadata);
        assert!(page.analysis().is_none());
        assert!(page.records().is_empty());
        assert!(!page.aspects_expanded());
    }

    #[test]
    fn test_stale_responses_are_dropped() {
        let mut page = AnalysisPageController::new();
        let old_meta = expect_metadata(page.navigate(Some("abc")));
        page.metadata_settled(&old_meta, Ok(metadata()));
        let old_analysis = expect_analysis(page.request_review());

        let new_meta = expect_metadata(page.navigate(Some("xyz")));

        assert!(!page.analysis_settled(&old_analysis, Ok(analysis())));
        assert!(page.analysis().is_none());

        assert!(page.metadata_settled(&new_meta, Ok(metadata())));
        assert_eq!(page.state(), PageState::Ready);
        assert_eq!(page.identifier(), Some("xyz"));
    }

    #[test]
    fn test_returning_to_identifier_drops_first_visit() {
        let mut page = AnalysisPageController::new();
        let first = expect_metadata(page.navigate(Some("abc")));
        page.navigate(Some("xyz"));
        let again = expect_metadata(page.navigate(Some("abc")));

        assert!(!page.metadata_settled(&first, Err(FetchError::NotFound)));
        assert_eq!(page.state(), PageState::LoadingMetadata);
        assert!(page.metadata_settled(&again, Ok(metadata())));
        assert_eq!(page.state(), PageState::Ready);
    }

    #[test]
    fn test_review_stays_enabled_after_metadata_failure() {
        let mut page = AnalysisPageController::new();
        let tag = expect_metadata(page.navigate(Some("abc")));
        page.metadata_settled(&tag, Err(FetchError::NotFound));

        assert!(page.review_enabled());
        let review = expect_analysis(page.request_review());
        page.analysis_settled(&review, Ok(analysis()));

        assert_eq!(page.state(), PageState::MetadataError);
        assert_eq!(page.analysis_state(), PageState::AnalysisReady);
        assert_eq!(page.records().len(), 2);
    }

    #[test]
    fn test_aspects_toggle_is_independent() {
        let mut page = ready_page("abc");

        page.toggle_aspects();
        assert!(page.aspects_expanded());
        assert_eq!(page.state(), PageState::Ready);
        assert!(!page.has_pending());

        page.toggle_aspects();
        assert!(!page.aspects_expanded());
    }
}
