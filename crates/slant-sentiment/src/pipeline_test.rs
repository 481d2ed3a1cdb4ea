use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use slant_core::{default_matchers, ArticleRecord, SentimentLabel};
use slant_db::{connect_memory, run_migrations, DbError, SqliteArticleStore};

use super::*;
use crate::bias::{entropy_profile, sentiment_profile};
use crate::error::SourceError;
use crate::sources::DirectorySource;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemorySource {
    /// id → (origin, content); `None` content fails to read.
    docs: BTreeMap<String, (String, Option<String>)>,
    unavailable: bool,
}

impl MemorySource {
    fn with(mut self, id: &str, origin: &str, content: &str) -> Self {
        self.docs.insert(
            id.to_string(),
            (origin.to_string(), Some(content.to_string())),
        );
        self
    }

    fn with_unreadable(mut self, id: &str) -> Self {
        self.docs
            .insert(id.to_string(), ("Lomark Daily".to_string(), None));
        self
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn list(&self) -> Result<Vec<DocumentRef>, SourceError> {
        if self.unavailable {
            return Err(SourceError::NotFound {
                path: "memory".to_string(),
            });
        }
        Ok(self
            .docs
            .iter()
            .map(|(id, (origin, _))| DocumentRef {
                document_id: id.clone(),
                origin: origin.clone(),
            })
            .collect())
    }

    async fn read(&self, document_id: &str) -> Result<String, SourceError> {
        match self.docs.get(document_id) {
            Some((_, Some(content))) => Ok(content.clone()),
            _ => Err(SourceError::Io {
                path: document_id.to_string(),
                source: std::io::Error::other("unreadable"),
            }),
        }
    }
}

/// Delegates to SQLite but refuses to write one document.
struct FailingStore {
    inner: SqliteArticleStore,
    fail_id: String,
}

#[async_trait]
impl ArticleStore for FailingStore {
    async fn upsert(&self, article: &NewArticle) -> Result<ArticleRecord, DbError> {
        if article.document_id == self.fail_id {
            return Err(DbError::Sqlx(sqlx::Error::RowNotFound));
        }
        self.inner.upsert(article).await
    }

    async fn get_all(&self) -> Result<Vec<ArticleRecord>, DbError> {
        self.inner.get_all().await
    }

    async fn count(&self) -> Result<i64, DbError> {
        self.inner.count().await
    }

    async fn content_hashes(&self) -> Result<HashMap<String, String>, DbError> {
        self.inner.content_hashes().await
    }
}

async fn memory_store() -> SqliteArticleStore {
    let pool = connect_memory().await.expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    SqliteArticleStore::new(pool, 50_000)
}

fn ingestor(config: AnalysisConfig) -> Ingestor {
    Ingestor::from_config(&config, &default_matchers()).expect("default matchers compile")
}

fn alvarez_source() -> MemorySource {
    MemorySource::default()
        .with(
            "a.txt",
            "Haacklee Herald",
            "Alvarez PLC reported excellent results this quarter.",
        )
        .with(
            "b.txt",
            "Lomark Daily",
            "Regulators say Alvarez PLC faces a terrible fraud scandal.",
        )
        .with(
            "c.txt",
            "The News Buoy",
            "Alvarez PLC held its annual meeting on Tuesday.",
        )
        .with("d.txt", "The News Buoy", "ok")
}

fn label_of(records: &[ArticleRecord], id: &str) -> SentimentLabel {
    records
        .iter()
        .find(|r| r.document_id == id)
        .map(|r| r.sentiment)
        .expect("record present")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_alvarez_scenario() {
    let store = memory_store().await;
    let summary = ingestor(AnalysisConfig::default())
        .run(&alvarez_source(), &store)
        .await
        .unwrap();

    assert_eq!(summary.total_candidates, 4);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.samples.len(), 3);
    assert_eq!(store.count().await.unwrap(), 3);

    let records = store.get_all().await.unwrap();
    assert_eq!(label_of(&records, "a.txt"), SentimentLabel::Positive);
    assert_eq!(label_of(&records, "b.txt"), SentimentLabel::Negative);
    assert_eq!(label_of(&records, "c.txt"), SentimentLabel::Neutral);
    assert!(records.iter().all(|r| r.document_id != "d.txt"));
    assert_eq!(records[1].source, "Lomark Daily");

    let sentiment = sentiment_profile(&records);
    let p = &sentiment["Alvarez PLC"];
    assert_eq!((p.positive, p.negative, p.neutral, p.total), (1, 1, 1, 3));

    let entropy = entropy_profile(&records);
    assert!((entropy["Alvarez PLC"].entropy - 3.0_f64.log2()).abs() < 1e-9);
}

#[tokio::test]
async fn rerun_does_no_redundant_work() {
    let store = memory_store().await;
    let ingestor = ingestor(AnalysisConfig::default());
    let source = alvarez_source();

    ingestor.run(&source, &store).await.unwrap();
    let before = store.get_all().await.unwrap();

    let summary = ingestor.run(&source, &store).await.unwrap();
    assert_eq!(summary.total_candidates, 4);
    assert_eq!(summary.already_ingested, 3);
    assert_eq!(summary.processed, 0);
    // The short document is never stored, so it is seen again and skipped again.
    assert_eq!(summary.skipped, 1);

    assert_eq!(store.get_all().await.unwrap(), before);
}

#[tokio::test]
async fn change_detection_reprocesses_only_changed_documents() {
    let store = memory_store().await;
    ingestor(AnalysisConfig::default())
        .run(&alvarez_source(), &store)
        .await
        .unwrap();

    let edited = alvarez_source().with(
        "b.txt",
        "Lomark Daily",
        "Alvarez PLC shared excellent news today.",
    );
    let config = AnalysisConfig {
        detect_changes: true,
        ..AnalysisConfig::default()
    };
    let summary = ingestor(config).run(&edited, &store).await.unwrap();

    assert_eq!(summary.already_ingested, 0);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.unchanged, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.samples[0].document_id, "b.txt");

    let records = store.get_all().await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(label_of(&records, "b.txt"), SentimentLabel::Positive);
}

#[tokio::test]
async fn short_or_blank_content_is_skipped_not_failed() {
    let store = memory_store().await;
    let source = MemorySource::default()
        .with("ok.txt", "Herald", "ok")
        .with("blank.txt", "Herald", "   \n\t  ")
        .with("padded.txt", "Herald", "     tiny     ");

    let summary = ingestor(AnalysisConfig::default())
        .run(&source, &store)
        .await
        .unwrap();

    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.failed, 0);
    assert!(summary.failures.is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn unavailable_source_is_fatal() {
    let store = memory_store().await;
    let source = MemorySource {
        unavailable: true,
        ..MemorySource::default()
    };

    let err = ingestor(AnalysisConfig::default())
        .run(&source, &store)
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        IngestError::SourceUnavailable(SourceError::NotFound { .. })
    ));
}

#[tokio::test]
async fn missing_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let source = DirectorySource::new(dir.path().join("absent"));
    let store = memory_store().await;

    let err = ingestor(AnalysisConfig::default())
        .run(&source, &store)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::SourceUnavailable(_)), "{err:?}");
}

#[tokio::test]
async fn per_document_failures_do_not_abort_the_run() {
    let inner = memory_store().await;
    let store = FailingStore {
        inner: inner.clone(),
        fail_id: "b.txt".to_string(),
    };
    let source = alvarez_source()
        .with("e.txt", "Herald", "Jones Group\0 reported good news.")
        .with_unreadable("f.txt");

    let summary = ingestor(AnalysisConfig::default())
        .run(&source, &store)
        .await
        .unwrap();

    assert_eq!(summary.total_candidates, 6);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 3);
    assert!(!summary.is_total_failure());

    let by_id: HashMap<&str, &IngestError> = summary
        .failures
        .iter()
        .map(|f| (f.document_id.as_str(), &f.error))
        .collect();
    assert!(matches!(
        by_id["b.txt"],
        IngestError::StoreWrite {
            source: DbError::Sqlx(sqlx::Error::RowNotFound),
            ..
        }
    ));
    assert!(matches!(by_id["e.txt"], IngestError::Classification { .. }));
    assert!(matches!(by_id["f.txt"], IngestError::DocumentRead { .. }));
    assert!(by_id.values().all(|e| !e.is_fatal()));

    let ids: Vec<String> = inner
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.document_id)
        .collect();
    assert_eq!(ids, vec!["a.txt", "c.txt"]);
}

#[tokio::test]
async fn batch_size_has_no_semantic_effect() {
    let source = alvarez_source()
        .with("e.txt", "Herald", "Jones Group and Frey Inc announced a merger.");

    let mut results = Vec::new();
    for batch_size in [1, 2, 10] {
        let store = memory_store().await;
        let config = AnalysisConfig {
            batch_size,
            ..AnalysisConfig::default()
        };
        let summary = ingestor(config).run(&source, &store).await.unwrap();
        assert_eq!(summary.processed, 4);

        let view: Vec<(String, SentimentLabel, Vec<String>, String)> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.document_id, r.sentiment, r.entities, r.content_hash))
            .collect();
        results.push(view);
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[tokio::test]
async fn samples_are_capped() {
    let store = memory_store().await;
    let config = AnalysisConfig {
        sample_results: 1,
        ..AnalysisConfig::default()
    };
    let summary = ingestor(config)
        .run(&alvarez_source(), &store)
        .await
        .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.samples.len(), 1);
    assert_eq!(summary.samples[0].document_id, "a.txt");
}

#[tokio::test]
async fn plan_reports_new_and_stored_documents() {
    let store = memory_store().await;
    let ingestor = ingestor(AnalysisConfig::default());
    ingestor.run(&alvarez_source(), &store).await.unwrap();

    let source = alvarez_source().with("z.txt", "Herald", "Frey Inc hired new staff.");
    let plan = ingestor.plan(&source, &store).await.unwrap();
    assert_eq!(plan.total_candidates, 5);
    assert_eq!(plan.already_ingested, 3);
    assert_eq!(plan.new_documents(), 2);
    assert_eq!(plan.rechecks(), 0);
}

#[test]
fn analyze_caps_entities_in_extraction_order() {
    let config = AnalysisConfig {
        max_entities_per_article: 2,
        ..AnalysisConfig::default()
    };
    let document = DocumentRef {
        document_id: "x.txt".to_string(),
        origin: "Herald".to_string(),
    };
    let content = "Alvarez PLC, Jones Group and Frey Inc signed with Oka Seafood.";

    let article = ingestor(config).analyze(&document, content).unwrap();
    assert_eq!(
        article.entities,
        vec!["Alvarez PLC".to_string(), "Jones Group".to_string()]
    );
    assert_eq!(article.word_count, 11);
    assert_eq!(article.source, "Herald");
    assert_eq!(article.content_hash, crate::text::content_hash(content));
}

#[test]
fn analyze_is_deterministic() {
    let ingestor = ingestor(AnalysisConfig::default());
    let document = DocumentRef {
        document_id: "x.txt".to_string(),
        origin: "Herald".to_string(),
    };
    let content = "Oka Seafood was not very successful, The News Buoy reported.";

    let first = ingestor.analyze(&document, content).unwrap();
    let second = ingestor.analyze(&document, content).unwrap();
    assert_eq!(first.entities, second.entities);
    assert_eq!(first.sentiment, second.sentiment);
    assert_eq!(first.polarity, second.polarity);
    assert_eq!(first.content_hash, second.content_hash);
}
