//! Ingestion orchestration.
//!
//! A run moves through `Scanning → Filtering → Processing → Done`. Listing
//! the source and reading the store's current ids are the only fatal steps;
//! every per-document failure is recorded in the summary and the run moves on.

use slant_core::{AnalysisConfig, MatcherConfig, NewArticle};
use slant_db::ArticleStore;

use crate::classifier::SentimentClassifier;
use crate::error::{ExtractionError, IngestError};
use crate::extractor::EntityExtractor;
use crate::sources::{DocumentRef, DocumentSource};
use crate::text::content_hash;
use crate::types::{
    ArticleSample, DocumentFailure, IngestPhase, IngestPlan, IngestSummary, PlannedDocument,
};

enum Outcome {
    Stored(Box<ArticleSample>),
    Skipped,
    Unchanged,
}

/// Drives a document source through the classifier and extractor into a store.
///
/// Holds no per-run state: each call to [`Ingestor::run`] starts from the
/// store's current contents.
#[derive(Debug, Clone)]
pub struct Ingestor {
    classifier: SentimentClassifier,
    extractor: EntityExtractor,
    config: AnalysisConfig,
}

impl Ingestor {
    #[must_use]
    pub fn new(
        classifier: SentimentClassifier,
        extractor: EntityExtractor,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            classifier,
            extractor,
            config,
        }
    }

    /// Build the classifier and extractor from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidPattern`] if a matcher does not compile.
    pub fn from_config(
        config: &AnalysisConfig,
        matchers: &[MatcherConfig],
    ) -> Result<Self, ExtractionError> {
        let extractor = EntityExtractor::new(matchers, config.min_entity_chars)?;
        Ok(Self::new(
            SentimentClassifier::from_config(config),
            extractor,
            config.clone(),
        ))
    }

    #[must_use]
    pub fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Classify and extract one document's content into an upsert payload.
    ///
    /// Pure: no I/O, and identical inputs give identical output.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Classification`] or [`IngestError::Extraction`]
    /// for malformed text.
    pub fn analyze(&self, document: &DocumentRef, content: &str) -> Result<NewArticle, IngestError> {
        self.build_article(document, content, content_hash(content))
    }

    fn build_article(
        &self,
        document: &DocumentRef,
        content: &str,
        hash: String,
    ) -> Result<NewArticle, IngestError> {
        let score =
            self.classifier
                .classify(content)
                .map_err(|source| IngestError::Classification {
                    document_id: document.document_id.clone(),
                    source,
                })?;

        let mut entities =
            self.extractor
                .extract(content)
                .map_err(|source| IngestError::Extraction {
                    document_id: document.document_id.clone(),
                    source,
                })?;
        entities.truncate(self.config.max_entities_per_article);

        Ok(NewArticle {
            document_id: document.document_id.clone(),
            source: document.origin.clone(),
            content: content.to_string(),
            content_hash: hash,
            sentiment: score.label,
            polarity: score.polarity,
            subjectivity: score.subjectivity,
            entities,
            word_count: i64::try_from(content.split_whitespace().count()).unwrap_or(i64::MAX),
        })
    }

    /// Scan the source and select the documents a run would process.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::SourceUnavailable`] if the source cannot be
    /// listed, or [`IngestError::StoreUnavailable`] if stored ids cannot be read.
    pub async fn plan<S, W>(&self, source: &S, store: &W) -> Result<IngestPlan, IngestError>
    where
        S: DocumentSource + ?Sized,
        W: ArticleStore + ?Sized,
    {
        tracing::info!(phase = %IngestPhase::Scanning, "listing candidate documents");
        let candidates = source.list().await.map_err(IngestError::SourceUnavailable)?;

        tracing::info!(
            phase = %IngestPhase::Filtering,
            candidates = candidates.len(),
            "filtering against stored documents"
        );
        let stored = store
            .content_hashes()
            .await
            .map_err(IngestError::StoreUnavailable)?;

        let mut plan = IngestPlan {
            total_candidates: candidates.len(),
            ..IngestPlan::default()
        };
        for document in candidates {
            match stored.get(&document.document_id) {
                None => plan.work.push(PlannedDocument {
                    document,
                    stored_hash: None,
                }),
                Some(hash) if self.config.detect_changes => plan.work.push(PlannedDocument {
                    document,
                    stored_hash: Some(hash.clone()),
                }),
                Some(_) => plan.already_ingested += 1,
            }
        }

        Ok(plan)
    }

    /// Run one ingestion pass from `source` into `store`.
    ///
    /// # Errors
    ///
    /// Only the fatal variants of [`IngestError`] are returned; per-document
    /// failures are collected into [`IngestSummary::failures`].
    pub async fn run<S, W>(&self, source: &S, store: &W) -> Result<IngestSummary, IngestError>
    where
        S: DocumentSource + ?Sized,
        W: ArticleStore + ?Sized,
    {
        let plan = match self.plan(source, store).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!(error = %e, "ingest run aborted");
                return Err(e);
            }
        };

        let mut summary = IngestSummary {
            total_candidates: plan.total_candidates,
            already_ingested: plan.already_ingested,
            ..IngestSummary::default()
        };

        tracing::info!(
            phase = %IngestPhase::Processing,
            new = plan.new_documents(),
            rechecks = plan.rechecks(),
            already_ingested = plan.already_ingested,
            "processing documents"
        );

        let batch_size = self.config.batch_size.max(1);
        for (index, batch) in plan.work.chunks(batch_size).enumerate() {
            tracing::debug!(batch = index + 1, size = batch.len(), "processing batch");
            for item in batch {
                match self.process(source, store, item).await {
                    Ok(Outcome::Stored(sample)) => {
                        summary.processed += 1;
                        if summary.samples.len() < self.config.sample_results {
                            summary.samples.push(*sample);
                        }
                    }
                    Ok(Outcome::Skipped) => summary.skipped += 1,
                    Ok(Outcome::Unchanged) => summary.unchanged += 1,
                    Err(error) => {
                        tracing::warn!(
                            document_id = %item.document.document_id,
                            error = %error,
                            "document failed, continuing"
                        );
                        summary.failed += 1;
                        summary.failures.push(DocumentFailure {
                            document_id: item.document.document_id.clone(),
                            error,
                        });
                    }
                }
            }
        }

        tracing::info!(
            phase = %IngestPhase::Done,
            total_candidates = summary.total_candidates,
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            unchanged = summary.unchanged,
            "ingest run finished"
        );

        Ok(summary)
    }

    async fn process<S, W>(
        &self,
        source: &S,
        store: &W,
        item: &PlannedDocument,
    ) -> Result<Outcome, IngestError>
    where
        S: DocumentSource + ?Sized,
        W: ArticleStore + ?Sized,
    {
        let document = &item.document;
        let raw = source
            .read(&document.document_id)
            .await
            .map_err(|source| IngestError::DocumentRead {
                document_id: document.document_id.clone(),
                source,
            })?;

        let content = raw.trim();
        if content.chars().count() < self.config.content_min_chars {
            tracing::debug!(
                document_id = %document.document_id,
                chars = content.chars().count(),
                "skipping document below minimum length"
            );
            return Ok(Outcome::Skipped);
        }

        let hash = content_hash(content);
        if item.stored_hash.as_deref() == Some(hash.as_str()) {
            return Ok(Outcome::Unchanged);
        }

        let article = self.build_article(document, content, hash)?;
        let record = store
            .upsert(&article)
            .await
            .map_err(|source| IngestError::StoreWrite {
                document_id: document.document_id.clone(),
                source,
            })?;

        Ok(Outcome::Stored(Box::new(ArticleSample::from(&record))))
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
