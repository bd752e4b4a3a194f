//! Page view rendering.
//!
//! This module turns the analysis page state into either a terminal card
//! or a JSON snapshot.

use crate::analysis::slice_shares;
use crate::models::{AnalysisResult, ScoreBand, VideoMetadata, VisualizationRecord};
use crate::page::{AnalysisPageController, LoadedAnalysis, PageState};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

const BAR_WIDTH: usize = 30;

/// Render the page as a terminal card.
pub fn generate_text_view(page: &AnalysisPageController) -> String {
    let mut output = String::new();

    match page.state() {
        PageState::Invalid => {
            output.push_str(&generate_error_card(page.message().as_deref()));
        }
        PageState::LoadingMetadata => {
            output.push_str("Loading video details...\n\n");
        }
        PageState::MetadataError => {
            output.push_str(&generate_error_card(page.message().as_deref()));
            output.push_str(&generate_analysis_section(page));
        }
        _ => {
            if let Some(metadata) = page.metadata() {
                output.push_str(&generate_video_section(metadata));
            }
            output.push_str(&generate_analysis_section(page));
        }
    }

    output
}

/// Generate the "no video" card.
fn generate_error_card(message: Option<&str>) -> String {
    let mut card = String::new();

    card.push_str("## No video to show\n\n");
    card.push_str(message.unwrap_or("Please go back and enter a valid YouTube link."));
    card.push_str("\n\n");

    card
}

/// Generate the video details section.
fn generate_video_section(metadata: &VideoMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!("# {}\n\n", metadata.title));
    section.push_str(&format!("- **Channel:** {}\n", metadata.channel));
    section.push_str(&format!("- **Views:** {}\n", metadata.views));
    section.push_str(&format!("- **Likes:** {}\n", metadata.likes));
    section.push_str(&format!("- **Thumbnail:** {}\n", metadata.thumbnail_url));
    section.push('\n');

    section
}

/// Generate the analysis section: action state, then results.
fn generate_analysis_section(page: &AnalysisPageController) -> String {
    let mut section = String::new();

    let button = if page.analysis_in_flight() {
        "[Analyzing video...]"
    } else {
        "[Get Review]"
    };
    section.push_str(&format!("## Detailed Analysis {}\n\n", button));

    if page.analysis_in_flight() {
        section.push_str("Fetching detailed review...\n\n");
        return section;
    }

    if let Some(message) = page.analysis_message() {
        section.push_str(&format!("> {}\n\n", message));
    }

    match page.analysis() {
        Some(loaded) => section.push_str(&generate_results(loaded, page.aspects_expanded())),
        None if page.analysis_message().is_none() => section.push_str("No reviews to show\n\n"),
        None => {}
    }

    section
}

/// Generate the scores, summary, chart, and aspects of a loaded analysis.
fn generate_results(loaded: &LoadedAnalysis, aspects_expanded: bool) -> String {
    let mut block = String::new();
    let result = &loaded.result;
    let aggregate = &result.aggregate;

    block.push_str(&format!(
        "**Overall Sentiment:** {} {}\n",
        aggregate.overall_sentiment.emoji(),
        aggregate.overall_sentiment
    ));
    block.push_str(&format!(
        "**Analysed score:** {} {} / 10   (based on {} comments)\n",
        ScoreBand::from_score(aggregate.adjusted_score).emoji(),
        aggregate.adjusted_score,
        result.raw_count
    ));
    block.push_str(&format!(
        "**Absolute score:** {} {} / 10   (undamped)\n\n",
        ScoreBand::from_score(aggregate.scaled_score).emoji(),
        aggregate.scaled_score
    ));
    block.push_str(&format!("**Review:** {}\n\n", result.review.summary));

    block.push_str(&generate_chart(&loaded.records));
    block.push_str(&generate_aspects(result, aspects_expanded));

    block
}

/// Generate a horizontal-bar rendition of the category pie.
fn generate_chart(records: &[VisualizationRecord]) -> String {
    if records.is_empty() {
        return "No category data available for visualization.\n\n".to_string();
    }

    let mut chart = String::new();
    chart.push_str("### Categories\n\n");

    for (record, share) in records.iter().zip(slice_shares(records)) {
        let filled = (share * BAR_WIDTH as f64).round() as usize;
        chart.push_str(&format!(
            "{} {:<28} {:<width$} {:>5.1}%\n",
            record.color,
            record.label(),
            "█".repeat(filled),
            share * 100.0,
            width = BAR_WIDTH
        ));
    }

    let legend: Vec<String> = records.iter().map(|r| r.legend()).collect();
    chart.push_str(&format!("\nLegend: {}\n\n", legend.join(" · ")));

    chart
}

/// Generate the collapsible aspect list.
fn generate_aspects(result: &AnalysisResult, expanded: bool) -> String {
    let mut block = String::new();

    if !expanded {
        block.push_str("Aspects: Show individual aspects\n\n");
        return block;
    }

    block.push_str("Aspects: Hide individual aspects\n");
    for aspect in &result.aspect_list {
        block.push_str(&format!("- {}\n", aspect.display_line()));
    }
    block.push('\n');

    block
}

/// One chart record with its render-ready text.
#[derive(Debug, Serialize)]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a VisualizationRecord,
    label: String,
    tooltip: String,
    share: f64,
}

/// JSON shape of the page view.
#[derive(Debug, Serialize)]
struct PageSnapshot<'a> {
    state: PageState,
    analysis_state: PageState,
    identifier: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a VideoMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<&'a AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis_received_at: Option<DateTime<Utc>>,
    records: Vec<RecordView<'a>>,
    aspects_expanded: bool,
    review_enabled: bool,
    rendered_at: DateTime<Utc>,
}

/// Render the page as a JSON snapshot.
pub fn generate_json_view(page: &AnalysisPageController) -> Result<String> {
    let records = page.records();
    let records = records
        .iter()
        .zip(slice_shares(records))
        .map(|(record, share)| RecordView {
            record,
            label: record.label(),
            tooltip: record.tooltip(),
            share,
        })
        .collect();

    let snapshot = PageSnapshot {
        state: page.state(),
        analysis_state: page.analysis_state(),
        identifier: page.identifier(),
        message: page.message(),
        error_kind: page.error().map(|e| e.kind()),
        metadata: page.metadata(),
        analysis: page.analysis().map(|a| &a.result),
        analysis_received_at: page.analysis().map(|a| a.received_at),
        records,
        aspects_expanded: page.aspects_expanded(),
        review_enabled: page.review_enabled(),
        rendered_at: Utc::now(),
    };

    serde_json::to_string_pretty(&snapshot).map_err(Into::into)
}
