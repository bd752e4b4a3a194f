//! Video identifier helpers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved identifier meaning "no selection".
pub const SENTINEL: &str = "nothing";

static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:v=|youtu\.be/|embed/)([^&?/]+)").expect("valid video id regex"));

/// Absent, blank, and the sentinel are all equally unusable.
pub fn is_usable(identifier: Option<&str>) -> bool {
    match identifier {
        Some(id) => {
            let id = id.trim();
            !id.is_empty() && id != SENTINEL
        }
        None => false,
    }
}

/// Reduce a YouTube link to its video id. Input that does not look like a
/// link is returned trimmed, as a bare id.
pub fn extract_video_id(input: &str) -> String {
    let input = input.trim();
    VIDEO_ID_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| input.to_string())
}

/// Links pass through untouched; a bare id becomes a watch URL so the
/// collection service can parse it.
pub fn to_watch_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") || VIDEO_ID_RE.is_match(input)
    {
        input.to_string()
    } else {
        format!("https://www.youtube.com/watch?v={}", input)
    }
}

/// Normalize a navigation segment into a usable identifier, or `None`.
pub fn normalize(segment: Option<&str>) -> Option<String> {
    let id = extract_video_id(segment?);
    if is_usable(Some(&id)) {
        Some(id)
    } else {
        None
    }
}
