//! Category sentiment aggregation for the pie chart.
//!
//! Turns the service's `category -> { score, count }` map into one
//! visualization record per category. Pure and total: malformed entries
//! contribute `score = 0, count = 1` instead of failing.

use crate::models::VisualizationRecord;
use serde_json::{Map, Value};

/// Fixed slice palette. Colors repeat cyclically past the end.
pub const COLOR_PALETTE: [&str; 10] = [
    "#4CAF50", "#2196F3", "#FF9800", "#9C27B0", "#00BCD4", "#E91E63", "#8BC34A", "#FFC107",
    "#F44336", "#795548",
];

/// Score and weight of one category, after defaulting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryScore {
    pub score: f64,
    pub count: u64,
}

impl CategoryScore {
    /// Read `{ score, count }` leniently. Anything unusable becomes
    /// `score = 0` / `count = 1`.
    pub fn from_value(value: &Value) -> Self {
        let score = value
            .get("score")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite())
            .unwrap_or(0.0);
        let count = value.get("count").and_then(whole_count).unwrap_or(1);

        Self { score, count }
    }

    /// Slice weight: `|score| * max(count, 1)`.
    pub fn weight(&self) -> f64 {
        self.score.abs() * self.count.max(1) as f64
    }
}

/// Counts may arrive as `3` or `3.0`; fractional or negative counts are unusable.
fn whole_count(raw: &Value) -> Option<u64> {
    raw.as_u64().or_else(|| {
        raw.as_f64()
            .filter(|c| c.is_finite() && *c >= 0.0 && c.fract() == 0.0)
            .map(|c| c as u64)
    })
}

/// Color for the slice at `position`.
pub fn palette_color(position: usize) -> &'static str {
    COLOR_PALETTE[position % COLOR_PALETTE.len()]
}

/// Category keys use `_` as a word separator (`audio_quality`).
pub fn display_name(key: &str) -> String {
    key.replace('_', " ")
}

/// Derive visualization records from a category map.
///
/// An absent or empty map yields an empty vector ("no data"). Record order
/// follows the map's iteration order and colors depend only on position.
pub fn aggregate_categories(categories: Option<&Map<String, Value>>) -> Vec<VisualizationRecord> {
    let Some(categories) = categories else {
        return Vec::new();
    };

    categories
        .iter()
        .enumerate()
        .map(|(position, (key, raw))| {
            let category = CategoryScore::from_value(raw);
            VisualizationRecord {
                name: display_name(key),
                value: category.weight(),
                sentiment: category.score,
                color: palette_color(position),
            }
        })
        .collect()
}

/// Sum of all slice weights.
pub fn total_weight(records: &[VisualizationRecord]) -> f64 {
    records.iter().map(|r| r.value).sum()
}

/// Fraction of the pie taken by each record, in record order. All zeros when
/// every weight is zero.
pub fn slice_shares(records: &[VisualizationRecord]) -> Vec<f64> {
    let total = total_weight(records);
    records
        .iter()
        .map(|r| if total > 0.0 { r.value / total } else { 0.0 })
        .collect()
}
