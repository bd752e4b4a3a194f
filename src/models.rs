//! Data models for video metadata and sentiment analysis.
//!
//! These types mirror the JSON contracts of the collection/analysis service
//! and the video provider, plus the render-ready records derived from them.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A provider statistic that may be missing. Missing is distinct from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Count(u64),
    Unavailable,
}

impl Statistic {
    /// Parse a provider count, which arrives as a decimal string
    /// (`"1234"`) or occasionally as a JSON number.
    pub fn from_raw(raw: Option<&Value>) -> Self {
        match raw {
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map(Statistic::Count)
                .unwrap_or(Statistic::Unavailable),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Statistic::Count)
                .unwrap_or(Statistic::Unavailable),
            _ => Statistic::Unavailable,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Count(n) => write!(f, "{}", n),
            Statistic::Unavailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for Statistic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Statistic::Count(n) => serializer.serialize_u64(*n),
            Statistic::Unavailable => serializer.serialize_str("N/A"),
        }
    }
}

/// Details of one video, as shown on the analysis page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub title: String,
    pub channel: String,
    pub thumbnail_url: String,
    pub likes: Statistic,
    pub views: Statistic,
}

/// Overall label computed by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum OverallSentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl From<&str> for OverallSentiment {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "positive" => OverallSentiment::Positive,
            "negative" => OverallSentiment::Negative,
            _ => OverallSentiment::Neutral,
        }
    }
}

impl From<String> for OverallSentiment {
    fn from(s: String) -> Self {
        OverallSentiment::from(s.as_str())
    }
}

impl fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallSentiment::Positive => write!(f, "POSITIVE"),
            OverallSentiment::Neutral => write!(f, "NEUTRAL"),
            OverallSentiment::Negative => write!(f, "NEGATIVE"),
        }
    }
}

impl OverallSentiment {
    /// Returns an emoji marker for the label.
    pub fn emoji(&self) -> &'static str {
        match self {
            OverallSentiment::Positive => "🟢",
            OverallSentiment::Neutral => "🟡",
            OverallSentiment::Negative => "🔴",
        }
    }
}

/// Quality band of a 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBand::Good
        } else if score >= 5.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ScoreBand::Good => "🟢",
            ScoreBand::Fair => "🟡",
            ScoreBand::Poor => "🔴",
        }
    }
}

/// Aggregate scores for the whole comment set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateScores {
    #[serde(default)]
    pub overall_sentiment: OverallSentiment,
    /// Score in [0, 10], damped by comment count.
    #[serde(default)]
    pub adjusted_score: f64,
    /// Score in [0, 10], undamped.
    #[serde(default)]
    pub scaled_score: f64,
    /// Raw mean score in [-1, 1], when the service sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_score: Option<f64>,
}

/// Synthesized review text plus per-category sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default = "default_summary")]
    pub summary: String,
    /// Category name -> `{ score, count }`, in service order. Entries are
    /// kept as raw JSON so malformed ones can still be aggregated.
    #[serde(default)]
    pub categories: Map<String, Value>,
}

impl Default for Review {
    fn default() -> Self {
        Self {
            summary: default_summary(),
            categories: Map::new(),
        }
    }
}

fn default_summary() -> String {
    "No summary generated.".to_string()
}

/// One merged aspect and its sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectEntry {
    pub aspect: String,
    #[serde(default)]
    pub sentiment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl AspectEntry {
    /// Single display line, e.g. `pacing: positive (0.913)`.
    pub fn display_line(&self) -> String {
        match self.confidence {
            Some(c) => format!("{}: {} ({:.3})", self.aspect, self.sentiment, c),
            None => format!("{}: {}", self.aspect, self.sentiment),
        }
    }
}

/// Full analysis returned by `GET /course/{id}/analysis`.
///
/// When the service has no stored comments it omits `aggregate` and
/// `review`; both then fall back to neutral defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default)]
    pub aggregate: AggregateScores,
    #[serde(default)]
    pub raw_count: u64,
    #[serde(default)]
    pub review: Review,
    #[serde(default)]
    pub aspect_list: Vec<AspectEntry>,
}

/// One pie slice derived from a sentiment category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationRecord {
    /// Display name (separators replaced by spaces).
    pub name: String,
    /// Slice weight: `|score| * max(count, 1)`.
    pub value: f64,
    /// Signed category score, carried unchanged.
    pub sentiment: f64,
    /// Palette color picked by position.
    pub color: &'static str,
}

impl VisualizationRecord {
    /// Slice label, e.g. `pacing: +0.80`.
    pub fn label(&self) -> String {
        let sign = if self.sentiment > 0.0 { "+" } else { "" };
        format!("{}: {}{:.2}", self.name, sign, self.sentiment)
    }

    /// Tooltip text, e.g. `Score: 0.800`.
    pub fn tooltip(&self) -> String {
        format!("Score: {:.3}", self.sentiment)
    }

    /// Legend entry, e.g. `pacing (0.80)`.
    pub fn legend(&self) -> String {
        format!("{} ({:.2})", self.name, self.sentiment)
    }
}

/// Response of `POST /collect/{provider}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionReceipt {
    pub video_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub count: u64,
}
