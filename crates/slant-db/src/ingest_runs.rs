//! Database operations for the `ingest_runs` ledger.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `ingest_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_candidates: i64,
    pub already_ingested: i64,
    pub processed: i64,
    pub skipped: i64,
    pub unchanged: i64,
    pub failed: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters written when a run completes.
///
/// `already_ingested` documents were filtered out before processing;
/// `unchanged` ones were re-read and found to match their stored hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestRunCounts {
    pub total_candidates: i64,
    pub already_ingested: i64,
    pub processed: i64,
    pub skipped: i64,
    pub unchanged: i64,
    pub failed: i64,
}

const RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
     total_candidates, already_ingested, processed, skipped, unchanged, failed, \
     error_message, created_at";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Creates a new ingest run in `queued` status and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_ingest_run(
    pool: &SqlitePool,
    trigger_source: &str,
) -> Result<IngestRunRow, DbError> {
    let row = sqlx::query_as::<_, IngestRunRow>(&format!(
        "INSERT INTO ingest_runs (public_id, trigger_source, status, created_at) \
         VALUES (?, ?, 'queued', ?) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(trigger_source)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a `queued` run as `running` and sets `started_at`.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not queued,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_ingest_run(pool: &SqlitePool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs SET status = 'running', started_at = ? \
         WHERE id = ? AND status = 'queued'",
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a `running` run as `succeeded` and records its counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_ingest_run(
    pool: &SqlitePool,
    id: i64,
    counts: IngestRunCounts,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = 'succeeded', completed_at = ?, total_candidates = ?, \
             already_ingested = ?, processed = ?, skipped = ?, unchanged = ?, failed = ? \
         WHERE id = ? AND status = 'running'",
    )
    .bind(Utc::now())
    .bind(counts.total_candidates)
    .bind(counts.already_ingested)
    .bind(counts.processed)
    .bind(counts.skipped)
    .bind(counts.unchanged)
    .bind(counts.failed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a `running` run as `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_ingest_run(
    pool: &SqlitePool,
    id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs SET status = 'failed', completed_at = ?, error_message = ? \
         WHERE id = ? AND status = 'running'",
    )
    .bind(Utc::now())
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// List the most recent runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ingest_runs(pool: &SqlitePool, limit: i64) -> Result<Vec<IngestRunRow>, DbError> {
    let rows = sqlx::query_as::<_, IngestRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM ingest_runs ORDER BY id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
