//! Read-only aggregation and status handlers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use slant_core::{AppConfig, ArticleRecord};
use slant_db::{ArticleStore, SqliteArticleStore};
use slant_sentiment::{
    bias_report, entropy_profile, sentiment_profile, source_profile, EntityBiasReport, ReportOrder,
};
use sqlx::SqlitePool;

use crate::ReportFormat;

async fn load_records(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<Vec<ArticleRecord>> {
    let store = SqliteArticleStore::new(pool.clone(), config.analysis.content_max_chars);
    Ok(store.get_all().await?)
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Show per-entity sentiment counts, most covered entities first.
///
/// # Errors
///
/// Returns an error if the database query fails or `entity_filter` names an
/// entity that was never extracted.
pub(crate) async fn run_sentiment(
    pool: &SqlitePool,
    config: &AppConfig,
    entity_filter: Option<&str>,
    limit: usize,
) -> anyhow::Result<()> {
    let records = load_records(pool, config).await?;
    let profiles = sentiment_profile(&records);

    if profiles.is_empty() {
        println!("no articles ingested yet; run `slant ingest` first");
        return Ok(());
    }

    let mut rows: Vec<_> = match entity_filter {
        Some(entity) => {
            let profile = profiles
                .get(entity)
                .ok_or_else(|| anyhow::anyhow!("entity '{entity}' not found"))?;
            vec![profile.clone()]
        }
        None => profiles.into_values().collect(),
    };
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.entity.cmp(&b.entity)));

    println!(
        "{:<40}{:>6}{:>6}{:>6}{:>7}{:>9}{:>9}  DOMINANT",
        "ENTITY", "POS", "NEG", "NEU", "TOTAL", "POS%", "NEG%"
    );
    for p in rows.iter().take(limit) {
        println!(
            "{:<40}{:>6}{:>6}{:>6}{:>7}{:>9}{:>9}  {}",
            p.entity,
            p.positive,
            p.negative,
            p.neutral,
            p.total,
            percent(p.positive_ratio),
            percent(p.negative_ratio),
            p.dominant
        );
    }

    Ok(())
}

/// Rank entities with at least two articles by entropy or bias score.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_entropy(
    pool: &SqlitePool,
    config: &AppConfig,
    order: ReportOrder,
    limit: usize,
) -> anyhow::Result<()> {
    let records = load_records(pool, config).await?;
    let rows = bias_report(&records, config.analysis.bias_weights, order);

    if rows.is_empty() {
        println!("no entity appears in two or more articles yet");
        return Ok(());
    }

    let entropy = entropy_profile(&records);

    println!(
        "{:<40}{:>9}{:>9}{:>9}{:>10}  DOMINANT",
        "ENTITY", "ARTICLES", "ENTROPY", "BIAS", "SOURCE_H"
    );
    for row in rows.iter().take(limit) {
        let source_entropy = entropy.get(&row.entity).map_or(0.0, |e| e.source_entropy);
        println!(
            "{:<40}{:>9}{:>9.3}{:>9.3}{:>10.3}  {}",
            row.entity, row.article_count, row.entropy, row.bias_score, source_entropy, row.dominant
        );
    }

    Ok(())
}

/// Show how each publishing source covers each entity.
///
/// # Errors
///
/// Returns an error if the database query fails or `entity_filter` names an
/// entity that was never extracted.
pub(crate) async fn run_sources(
    pool: &SqlitePool,
    config: &AppConfig,
    entity_filter: Option<&str>,
) -> anyhow::Result<()> {
    let records = load_records(pool, config).await?;
    let mut profiles = source_profile(&records);

    if let Some(entity) = entity_filter {
        let only = profiles
            .remove(entity)
            .ok_or_else(|| anyhow::anyhow!("entity '{entity}' not found"))?;
        profiles = BTreeMap::from([(entity.to_string(), only)]);
    }

    if profiles.is_empty() {
        println!("no articles ingested yet; run `slant ingest` first");
        return Ok(());
    }

    println!(
        "{:<40}{:<24}{:>6}{:>6}{:>6}  DOMINANT",
        "ENTITY", "SOURCE", "POS", "NEG", "NEU"
    );
    for (entity, sources) in &profiles {
        for s in sources.values() {
            println!(
                "{:<40}{:<24}{:>6}{:>6}{:>6}  {}",
                entity, s.source, s.positive, s.negative, s.neutral, s.dominant
            );
        }
    }

    Ok(())
}

/// Print a bias report as markdown or JSON.
///
/// # Errors
///
/// Returns an error if the database query or JSON serialization fails.
pub(crate) async fn run_report(
    pool: &SqlitePool,
    config: &AppConfig,
    format: ReportFormat,
    order: ReportOrder,
) -> anyhow::Result<()> {
    let records = load_records(pool, config).await?;
    let rows = bias_report(&records, config.analysis.bias_weights, order);
    let now = Utc::now();

    match format {
        ReportFormat::Markdown => {
            print!("{}", render_markdown_report(&rows, records.len(), now));
        }
        ReportFormat::Json => {
            let report = serde_json::json!({
                "generated_at": now,
                "article_count": records.len(),
                "entities": rows,
                "sentiment_profile": sentiment_profile(&records),
                "entropy_profile": entropy_profile(&records),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Markdown rendering of a bias report.
pub(crate) fn render_markdown_report(
    rows: &[EntityBiasReport],
    article_count: usize,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Entity Bias Report");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Generated**: {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "**Articles**: {article_count}");
    let _ = writeln!(out, "**Entities (2+ articles)**: {}", rows.len());
    let _ = writeln!(out);

    if rows.is_empty() {
        let _ = writeln!(out, "_No entity appears in two or more articles._");
        return out;
    }

    let _ = writeln!(
        out,
        "| Entity | Articles | Positive | Negative | Entropy | Bias | Dominant |"
    );
    let _ = writeln!(
        out,
        "|--------|----------|----------|----------|---------|------|----------|"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {:.3} | {:.3} | {} |",
            row.entity,
            row.article_count,
            percent(row.positive_ratio),
            percent(row.negative_ratio),
            row.entropy,
            row.bias_score,
            row.dominant
        );
    }

    out
}

/// Show recent ingest runs and the stored article count.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_status(pool: &SqlitePool, limit: i64) -> anyhow::Result<()> {
    let store = SqliteArticleStore::new(pool.clone(), usize::MAX);
    let articles = store.count().await?;
    println!("articles stored: {articles}");

    let runs = slant_db::list_ingest_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no ingest runs recorded; run `slant ingest` first");
        return Ok(());
    }

    println!();
    println!(
        "{:<6}{:<11}{:<18}{:>11}{:>9}{:>11}{:>9}{:>11}{:>8}  ERROR",
        "ID",
        "STATUS",
        "STARTED",
        "CANDIDATES",
        "KNOWN",
        "PROCESSED",
        "SKIPPED",
        "UNCHANGED",
        "FAILED"
    );
    for run in &runs {
        let started = run.started_at.map_or_else(
            || "\u{2014}".to_string(),
            |t| t.format("%Y-%m-%d %H:%M").to_string(),
        );
        println!(
            "{:<6}{:<11}{:<18}{:>11}{:>9}{:>11}{:>9}{:>11}{:>8}  {}",
            run.id,
            run.status,
            started,
            run.total_candidates,
            run.already_ingested,
            run.processed,
            run.skipped,
            run.unchanged,
            run.failed,
            run.error_message.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
