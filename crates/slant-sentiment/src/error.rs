use slant_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid matcher pattern for {category}: {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed text: {0}")]
    MalformedText(&'static str),
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("malformed text: {0}")]
    MalformedText(&'static str),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("document source not found: {path}")]
    NotFound { path: String },

    #[error("invalid document id '{0}'")]
    InvalidDocumentId(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of an ingestion run.
///
/// `SourceUnavailable` and `StoreUnavailable` abort the run. The remaining
/// variants are per-document: they are logged, collected into the run summary,
/// and the run moves on to the next document.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("document source unavailable: {0}")]
    SourceUnavailable(#[source] SourceError),

    #[error("article store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),

    #[error("failed to read document '{document_id}': {source}")]
    DocumentRead {
        document_id: String,
        #[source]
        source: SourceError,
    },

    #[error("classification failed for '{document_id}': {source}")]
    Classification {
        document_id: String,
        #[source]
        source: SentimentError,
    },

    #[error("entity extraction failed for '{document_id}': {source}")]
    Extraction {
        document_id: String,
        #[source]
        source: ExtractionError,
    },

    #[error("failed to store '{document_id}': {source}")]
    StoreWrite {
        document_id: String,
        #[source]
        source: DbError,
    },
}

impl IngestError {
    /// Whether this error ends the run rather than a single document.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestError::SourceUnavailable(_) | IngestError::StoreUnavailable(_)
        )
    }
}
