//! Entity bias and entropy analysis for news articles.
//!
//! Extracts organization names with surface patterns, classifies each
//! article's sentiment with a lexical scorer, stores one record per document,
//! and aggregates the stored labels into per-entity sentiment, entropy and
//! bias profiles.

pub mod bias;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod scorer;
pub mod sources;
pub mod types;

mod text;

pub use bias::{
    bias_report, bias_score, entropy_profile, sentiment_profile, shannon_entropy, source_profile,
    EntityBiasReport, EntityEntropyProfile, EntitySentimentProfile, ReportOrder, SentimentCounts,
    SourceSentimentProfile,
};
pub use classifier::{SentimentClassifier, SentimentScore};
pub use error::{ExtractionError, IngestError, SentimentError, SourceError};
pub use extractor::{EntityExtractor, ExtractedEntity};
pub use pipeline::Ingestor;
pub use scorer::{lexical_score, LexicalScore};
pub use sources::{publisher_from_file_name, DirectorySource, DocumentRef, DocumentSource};
pub use text::content_hash;
pub use types::{
    ArticleSample, DocumentFailure, IngestPhase, IngestPlan, IngestSummary, PlannedDocument,
};
