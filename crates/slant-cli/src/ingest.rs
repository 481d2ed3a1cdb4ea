//! Ingestion command handler.

use std::path::PathBuf;

use slant_core::AppConfig;
use slant_db::{IngestRunCounts, SqliteArticleStore};
use slant_sentiment::{DirectorySource, IngestSummary, Ingestor};
use sqlx::SqlitePool;

use crate::{fail_run_best_effort, load_matcher_configs};

const DRY_RUN_PREVIEW: usize = 20;

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Print what an ingest would do without touching the database file.
///
/// Reads the configured database read-only. When it does not exist yet, or
/// has not been migrated, every candidate is planned as new.
///
/// # Errors
///
/// Returns an error if the source directory is missing or the store cannot be read.
pub(crate) async fn run_dry_run(config: &AppConfig, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let matchers = load_matcher_configs(config)?;
    let ingestor = Ingestor::from_config(&config.analysis, &matchers)?;
    let source = DirectorySource::new(dir.unwrap_or_else(|| config.articles_dir.clone()));
    let store = SqliteArticleStore::new(plan_pool(config).await?, config.analysis.content_max_chars);

    let plan = ingestor.plan(&source, &store).await?;
    println!(
        "dry-run: {} candidates in {}, {} already ingested, {} new, {} to recheck",
        plan.total_candidates,
        source.root().display(),
        plan.already_ingested,
        plan.new_documents(),
        plan.rechecks()
    );
    for planned in plan.work.iter().take(DRY_RUN_PREVIEW) {
        println!(
            "  {} ({})",
            planned.document.document_id, planned.document.origin
        );
    }
    if plan.work.len() > DRY_RUN_PREVIEW {
        println!("  ... and {} more", plan.work.len() - DRY_RUN_PREVIEW);
    }

    Ok(())
}

/// The configured database opened read-only, or an empty migrated in-memory one.
async fn plan_pool(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let pool_config = slant_db::PoolConfig::from_app_config(config);
    match slant_db::connect_read_only(&config.database_url, pool_config).await {
        Ok(pool) => {
            if slant_db::has_articles_table(&pool).await? {
                return Ok(pool);
            }
            tracing::info!("database not migrated yet; planning against an empty store");
        }
        Err(e) => tracing::info!(error = %e, "database unavailable; planning against an empty store"),
    }

    let pool = slant_db::connect_memory().await?;
    slant_db::run_migrations(&pool).await?;
    Ok(pool)
}

/// Ingest new or changed articles from `dir` (or the configured directory).
///
/// Each run is recorded in the `ingest_runs` ledger.
///
/// # Errors
///
/// Returns an error if the source directory is missing, the store cannot be
/// read, the run ledger cannot be updated, or every attempted document failed.
pub(crate) async fn run_ingest(
    pool: &SqlitePool,
    config: &AppConfig,
    dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let matchers = load_matcher_configs(config)?;
    let ingestor = Ingestor::from_config(&config.analysis, &matchers)?;
    let source = DirectorySource::new(dir.unwrap_or_else(|| config.articles_dir.clone()));
    let store = SqliteArticleStore::new(pool.clone(), config.analysis.content_max_chars);

    let run = slant_db::create_ingest_run(pool, "cli").await?;
    if let Err(e) = slant_db::start_ingest_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, e.to_string()).await;
        return Err(e.into());
    }

    let summary = match ingestor.run(&source, &store).await {
        Ok(summary) => summary,
        Err(e) => {
            fail_run_best_effort(pool, run.id, e.to_string()).await;
            return Err(e.into());
        }
    };

    print_summary(&summary);

    if summary.is_total_failure() {
        let message = format!("all {} attempted documents failed", summary.failed);
        fail_run_best_effort(pool, run.id, message.clone()).await;
        anyhow::bail!("{message}");
    }

    if let Err(err) = slant_db::complete_ingest_run(pool, run.id, run_counts(&summary)).await {
        fail_run_best_effort(pool, run.id, err.to_string()).await;
        return Err(err.into());
    }

    Ok(())
}

/// Ledger counters for a finished run.
pub(crate) fn run_counts(summary: &IngestSummary) -> IngestRunCounts {
    IngestRunCounts {
        total_candidates: to_i64(summary.total_candidates),
        already_ingested: to_i64(summary.already_ingested),
        processed: to_i64(summary.processed),
        skipped: to_i64(summary.skipped),
        unchanged: to_i64(summary.unchanged),
        failed: to_i64(summary.failed),
    }
}

fn print_summary(summary: &IngestSummary) {
    println!(
        "ingest complete: {} candidates, {} already ingested, {} processed, {} skipped, {} unchanged, {} failed",
        summary.total_candidates,
        summary.already_ingested,
        summary.processed,
        summary.skipped,
        summary.unchanged,
        summary.failed
    );

    if !summary.samples.is_empty() {
        println!();
        println!(
            "{:<48}{:<20}{:<10}{:<10}ENTITIES",
            "DOCUMENT", "SOURCE", "LABEL", "POLARITY"
        );
        for sample in &summary.samples {
            let mut entities = sample.entities.join(", ");
            if sample.entity_count > sample.entities.len() {
                entities.push_str(&format!(" (+{})", sample.entity_count - sample.entities.len()));
            }
            println!(
                "{:<48}{:<20}{:<10}{:<10.3}{}",
                sample.document_id,
                sample.source,
                sample.sentiment.as_str(),
                sample.polarity,
                entities
            );
        }
    }

    if !summary.failures.is_empty() {
        println!();
        println!("failures:");
        for failure in &summary.failures {
            println!("  {}: {}", failure.document_id, failure.error);
        }
    }
}
