//! Article record store backed by the `articles` table.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slant_core::{truncate_content, ArticleRecord, NewArticle, SentimentLabel};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// Idempotent, keyed storage of one record per source document.
///
/// Each `upsert` is atomic: a reader sees either the previous record or the
/// new one, never a mix. A failed `upsert` leaves every other record intact.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert or fully replace the record for `article.document_id`.
    async fn upsert(&self, article: &NewArticle) -> Result<ArticleRecord, DbError>;

    /// Snapshot of every stored record, ordered by `document_id`.
    async fn get_all(&self) -> Result<Vec<ArticleRecord>, DbError>;

    async fn count(&self) -> Result<i64, DbError>;

    /// `document_id` → `content_hash` for every stored record.
    async fn content_hashes(&self) -> Result<HashMap<String, String>, DbError>;

    async fn document_ids(&self) -> Result<HashSet<String>, DbError> {
        Ok(self.content_hashes().await?.into_keys().collect())
    }
}

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub document_id: String,
    pub source: String,
    pub content: String,
    pub content_hash: String,
    pub sentiment: String,
    pub polarity: f64,
    pub subjectivity: f64,
    pub entities: Json<Vec<String>>,
    pub word_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ArticleRow> for ArticleRecord {
    type Error = DbError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let sentiment = row
            .sentiment
            .parse::<SentimentLabel>()
            .map_err(|reason| DbError::CorruptRow {
                document_id: row.document_id.clone(),
                reason,
            })?;

        Ok(ArticleRecord {
            document_id: row.document_id,
            source: row.source,
            content: row.content,
            content_hash: row.content_hash,
            sentiment,
            polarity: row.polarity,
            subjectivity: row.subjectivity,
            entities: row.entities.0,
            word_count: row.word_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ARTICLE_COLUMNS: &str = "document_id, source, content, content_hash, sentiment, \
     polarity, subjectivity, entities, word_count, created_at, updated_at";

// ---------------------------------------------------------------------------
// SQLite implementation
// ---------------------------------------------------------------------------

/// [`ArticleStore`] over a SQLite pool. Content longer than
/// `content_max_chars` is truncated before it is written.
#[derive(Debug, Clone)]
pub struct SqliteArticleStore {
    pool: SqlitePool,
    content_max_chars: usize,
}

impl SqliteArticleStore {
    #[must_use]
    pub fn new(pool: SqlitePool, content_max_chars: usize) -> Self {
        Self {
            pool,
            content_max_chars,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Fetch one record by id, or `None` if it has never been stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the query fails.
    pub async fn get(&self, document_id: &str) -> Result<Option<ArticleRecord>, DbError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE document_id = ?"
        ))
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ArticleRecord::try_from).transpose()
    }
}

#[async_trait]
impl ArticleStore for SqliteArticleStore {
    async fn upsert(&self, article: &NewArticle) -> Result<ArticleRecord, DbError> {
        let content = truncate_content(&article.content, self.content_max_chars);
        let now = Utc::now();

        // created_at keeps the first ingestion time; updated_at only moves when
        // the content hash changes.
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "INSERT INTO articles ({ARTICLE_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(document_id) DO UPDATE SET \
                 source = excluded.source, \
                 content = excluded.content, \
                 content_hash = excluded.content_hash, \
                 sentiment = excluded.sentiment, \
                 polarity = excluded.polarity, \
                 subjectivity = excluded.subjectivity, \
                 entities = excluded.entities, \
                 word_count = excluded.word_count, \
                 updated_at = CASE \
                     WHEN articles.content_hash = excluded.content_hash THEN articles.updated_at \
                     ELSE excluded.updated_at \
                 END \
             RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(&article.document_id)
        .bind(&article.source)
        .bind(&content)
        .bind(&article.content_hash)
        .bind(article.sentiment.as_str())
        .bind(article.polarity)
        .bind(article.subjectivity)
        .bind(Json(&article.entities))
        .bind(article.word_count)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            document_id = %article.document_id,
            sentiment = %article.sentiment,
            entities = article.entities.len(),
            "article upserted"
        );

        ArticleRecord::try_from(row)
    }

    async fn get_all(&self) -> Result<Vec<ArticleRecord>, DbError> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY document_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ArticleRecord::try_from).collect()
    }

    async fn count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn content_hashes(&self) -> Result<HashMap<String, String>, DbError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT document_id, content_hash FROM articles")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }
}
