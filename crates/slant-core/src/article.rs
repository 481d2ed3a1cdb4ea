use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Appended to stored content that was cut at the configured cap.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Three-way discretized sentiment of one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label '{other}'")),
        }
    }
}

/// A stored, derived view of one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub document_id: String,
    /// Publisher label derived from the document origin.
    pub source: String,
    /// Possibly truncated, see [`TRUNCATION_MARKER`].
    pub content: String,
    /// Hex SHA-256 of the content as read from the source, before truncation.
    pub content_hash: String,
    pub sentiment: SentimentLabel,
    pub polarity: f64,
    pub subjectivity: f64,
    /// Extraction order, duplicates removed, capped.
    pub entities: Vec<String>,
    pub word_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input to an article upsert.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub document_id: String,
    pub source: String,
    pub content: String,
    pub content_hash: String,
    pub sentiment: SentimentLabel,
    pub polarity: f64,
    pub subjectivity: f64,
    pub entities: Vec<String>,
    pub word_count: i64,
}

/// Cut `content` to at most `max_chars` characters, appending
/// [`TRUNCATION_MARKER`] when anything was removed.
///
/// Counts Unicode scalar values, not bytes, so the cut never splits a
/// character.
#[must_use]
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            out.push_str(&content[..byte_idx]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trips_through_str() {
        for label in SentimentLabel::ALL {
            assert_eq!(label.as_str().parse::<SentimentLabel>().unwrap(), label);
        }
    }

    #[test]
    fn label_display_respects_width() {
        assert_eq!(format!("{:<10}|", SentimentLabel::Neutral), "neutral   |");
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!("mixed".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn short_content_is_untouched() {
        assert_eq!(truncate_content("hello", 10), "hello");
        assert_eq!(truncate_content("hello", 5), "hello");
    }

    #[test]
    fn long_content_is_cut_and_marked() {
        let content = "x".repeat(60_000);
        let stored = truncate_content(&content, 50_000);
        assert_eq!(stored.chars().count(), 50_000 + TRUNCATION_MARKER.len());
        assert!(stored.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let stored = truncate_content("ééééé", 2);
        assert_eq!(stored, format!("éé{TRUNCATION_MARKER}"));
    }
}
