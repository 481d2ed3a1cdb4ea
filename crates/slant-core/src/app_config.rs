use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Weights of the composite bias score.
///
/// `score = skew * |positive_ratio - negative_ratio| + concentration * (1 - min(entropy, 1))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasWeights {
    pub skew: f64,
    pub concentration: f64,
}

impl Default for BiasWeights {
    fn default() -> Self {
        Self {
            skew: 0.6,
            concentration: 0.4,
        }
    }
}

/// Tunables for classification, storage and ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Polarity strictly above this is `positive`.
    pub positive_threshold: f64,
    /// Polarity strictly below this is `negative`.
    pub negative_threshold: f64,
    pub content_max_chars: usize,
    /// Trimmed content shorter than this is skipped.
    pub content_min_chars: usize,
    pub batch_size: usize,
    pub max_entities_per_article: usize,
    pub min_entity_chars: usize,
    /// Successful results kept in a run summary.
    pub sample_results: usize,
    pub bias_weights: BiasWeights,
    /// Re-read already ingested documents and reprocess those whose content hash moved.
    pub detect_changes: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 0.1,
            negative_threshold: -0.1,
            content_max_chars: 50_000,
            content_min_chars: 10,
            batch_size: 10,
            max_entities_per_article: 20,
            min_entity_chars: 4,
            sample_results: 20,
            bias_weights: BiasWeights::default(),
            detect_changes: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub articles_dir: PathBuf,
    pub patterns_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub analysis: AnalysisConfig,
}
