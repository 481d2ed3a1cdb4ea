use serde::Serialize;
use slant_core::{ArticleRecord, SentimentLabel};

use crate::error::IngestError;
use crate::sources::DocumentRef;

/// Entities shown per sample result.
const SAMPLE_ENTITY_LIMIT: usize = 5;

/// Short view of one successfully processed article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleSample {
    pub document_id: String,
    pub source: String,
    pub sentiment: SentimentLabel,
    pub polarity: f64,
    /// First few entities in extraction order.
    pub entities: Vec<String>,
    pub entity_count: usize,
    pub word_count: i64,
}

impl From<&ArticleRecord> for ArticleSample {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            document_id: record.document_id.clone(),
            source: record.source.clone(),
            sentiment: record.sentiment,
            polarity: record.polarity,
            entities: record
                .entities
                .iter()
                .take(SAMPLE_ENTITY_LIMIT)
                .cloned()
                .collect(),
            entity_count: record.entities.len(),
            word_count: record.word_count,
        }
    }
}

/// States of one ingestion run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Scanning,
    Filtering,
    Processing,
    Done,
}

impl std::fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestPhase::Scanning => write!(f, "scanning"),
            IngestPhase::Filtering => write!(f, "filtering"),
            IngestPhase::Processing => write!(f, "processing"),
            IngestPhase::Done => write!(f, "done"),
        }
    }
}

/// A document selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDocument {
    pub document: DocumentRef,
    /// Hash of the stored record when this is a change-detection recheck.
    pub stored_hash: Option<String>,
}

/// Result of the filtering phase.
#[derive(Debug, Clone, Default)]
pub struct IngestPlan {
    pub total_candidates: usize,
    pub already_ingested: usize,
    pub work: Vec<PlannedDocument>,
}

impl IngestPlan {
    /// Documents never stored before.
    #[must_use]
    pub fn new_documents(&self) -> usize {
        self.work.iter().filter(|w| w.stored_hash.is_none()).count()
    }

    /// Stored documents queued for a content-hash recheck.
    #[must_use]
    pub fn rechecks(&self) -> usize {
        self.work.len() - self.new_documents()
    }
}

/// A document that was attempted and failed.
#[derive(Debug)]
pub struct DocumentFailure {
    pub document_id: String,
    pub error: IngestError,
}

/// Outcome of one ingestion run.
///
/// `processed + skipped + failed + unchanged` equals the number of documents
/// that made it past filtering.
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Documents listed by the source.
    pub total_candidates: usize,
    /// Candidates already in the store and not rechecked.
    pub already_ingested: usize,
    pub processed: usize,
    /// Empty or too short to analyze.
    pub skipped: usize,
    pub failed: usize,
    /// Rechecked and found identical to the stored record.
    pub unchanged: usize,
    /// Capped sample of successful results, in processing order.
    pub samples: Vec<ArticleSample>,
    pub failures: Vec<DocumentFailure>,
}

impl IngestSummary {
    /// Documents that went through the processing phase.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.processed + self.skipped + self.failed + self.unchanged
    }

    /// Every attempted document failed.
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        self.failed > 0 && self.failed == self.attempted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_failure_needs_every_document_to_fail() {
        let mut summary = IngestSummary {
            failed: 2,
            ..IngestSummary::default()
        };
        assert!(summary.is_total_failure());

        summary.processed = 1;
        assert!(!summary.is_total_failure());

        assert!(!IngestSummary::default().is_total_failure());
    }
}
