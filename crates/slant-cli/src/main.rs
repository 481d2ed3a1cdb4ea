use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use slant_core::{AppConfig, MatcherConfig};
use slant_sentiment::ReportOrder;
use sqlx::SqlitePool;
use tracing_subscriber::EnvFilter;

mod ingest;
mod inspect;
mod query;

#[derive(Debug, Parser)]
#[command(name = "slant")]
#[command(about = "Entity bias and entropy analysis for news articles")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Ingest new articles from a directory of text files
    Ingest {
        /// Article directory (defaults to `SLANT_ARTICLES_DIR`)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Show what would be processed without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show per-entity sentiment counts
    Sentiment {
        /// Show a single entity
        #[arg(long)]
        entity: Option<String>,
        /// Maximum number of entities to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Rank entities by sentiment entropy and bias score
    Entropy {
        #[arg(long, value_enum, default_value_t = SortOrder::Entropy)]
        sort: SortOrder,
        /// Maximum number of entities to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Break entity sentiment down by publishing source
    Sources {
        /// Show a single entity
        #[arg(long)]
        entity: Option<String>,
    },
    /// Generate a bias report
    Report {
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
        #[arg(long, value_enum, default_value_t = SortOrder::Entropy)]
        sort: SortOrder,
    },
    /// Show recent ingest runs
    Status {
        /// Maximum number of runs to show
        #[arg(long, default_value = "10")]
        limit: i64,
    },
    /// Classify the sentiment of a piece of text
    Classify { text: String },
    /// Extract entity names from a piece of text
    Extract { text: String },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortOrder {
    Entropy,
    Bias,
    Articles,
}

impl From<SortOrder> for ReportOrder {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Entropy => ReportOrder::Entropy,
            SortOrder::Bias => ReportOrder::BiasScore,
            SortOrder::Articles => ReportOrder::Articles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("slant: no command given; run `slant --help` for usage");
        return Ok(());
    };

    let config = slant_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = slant_db::run_migrations(&pool).await?;
                    println!("migrations applied: {applied}");
                }
                DbCommands::Ping => {
                    slant_db::ping(&pool).await?;
                    println!("database ok: {}", config.database_url);
                }
            }
        }
        Commands::Ingest { dir, dry_run: true } => ingest::run_dry_run(&config, dir).await?,
        Commands::Ingest {
            dir,
            dry_run: false,
        } => {
            let pool = connect_migrated(&config).await?;
            ingest::run_ingest(&pool, &config, dir).await?;
        }
        Commands::Sentiment { entity, limit } => {
            let pool = connect_migrated(&config).await?;
            query::run_sentiment(&pool, &config, entity.as_deref(), limit).await?;
        }
        Commands::Entropy { sort, limit } => {
            let pool = connect_migrated(&config).await?;
            query::run_entropy(&pool, &config, sort.into(), limit).await?;
        }
        Commands::Sources { entity } => {
            let pool = connect_migrated(&config).await?;
            query::run_sources(&pool, &config, entity.as_deref()).await?;
        }
        Commands::Report { format, sort } => {
            let pool = connect_migrated(&config).await?;
            query::run_report(&pool, &config, format, sort.into()).await?;
        }
        Commands::Status { limit } => {
            let pool = connect_migrated(&config).await?;
            query::run_status(&pool, limit).await?;
        }
        Commands::Classify { text } => inspect::run_classify(&config, &text)?,
        Commands::Extract { text } => inspect::run_extract(&config, &text)?,
    }

    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let pool_config = slant_db::PoolConfig::from_app_config(config);
    let pool = slant_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

async fn connect_migrated(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let pool = connect(config).await?;
    slant_db::run_migrations(&pool).await?;
    Ok(pool)
}

/// Matchers from `SLANT_PATTERNS_PATH`, or the built-in set.
fn load_matcher_configs(config: &AppConfig) -> anyhow::Result<Vec<MatcherConfig>> {
    match &config.patterns_path {
        Some(path) => Ok(slant_core::load_matchers(path)?),
        None => Ok(slant_core::default_matchers()),
    }
}

/// Best-effort helper to mark an ingest run as failed.
///
/// Logs at `error` level if the failure update itself fails, but never
/// propagates that secondary error; the caller's original error is returned.
async fn fail_run_best_effort(pool: &SqlitePool, run_id: i64, message: String) {
    if let Err(mark_err) = slant_db::fail_ingest_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark ingest run as failed"
        );
    }
}
