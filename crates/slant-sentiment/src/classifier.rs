//! Three-way sentiment classification over the lexical scorer.

use serde::Serialize;
use slant_core::{AnalysisConfig, SentimentLabel};

use crate::error::SentimentError;
use crate::scorer::lexical_score;
use crate::text::malformed_reason;

/// Classifier output for one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// In `[-1.0, 1.0]`.
    pub polarity: f64,
    /// In `[0.0, 1.0]`.
    pub subjectivity: f64,
}

/// Stateless polarity classifier. Holds only its thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentClassifier {
    positive_threshold: f64,
    negative_threshold: f64,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        let defaults = AnalysisConfig::default();
        Self::new(defaults.positive_threshold, defaults.negative_threshold)
    }
}

impl SentimentClassifier {
    #[must_use]
    pub fn new(positive_threshold: f64, negative_threshold: f64) -> Self {
        Self {
            positive_threshold,
            negative_threshold,
        }
    }

    #[must_use]
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.positive_threshold, config.negative_threshold)
    }

    /// Bucket a polarity. Both thresholds are exclusive.
    #[must_use]
    pub fn label_for(&self, polarity: f64) -> SentimentLabel {
        if polarity > self.positive_threshold {
            SentimentLabel::Positive
        } else if polarity < self.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Score and label `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::MalformedText`] for binary or NUL-containing input.
    pub fn classify(&self, text: &str) -> Result<SentimentScore, SentimentError> {
        if let Some(reason) = malformed_reason(text) {
            return Err(SentimentError::MalformedText(reason));
        }

        let score = lexical_score(text);
        Ok(SentimentScore {
            label: self.label_for(score.polarity),
            polarity: score.polarity,
            subjectivity: score.subjectivity,
        })
    }
}
