mod app_config;
mod article;
mod config;
mod matchers;

pub use app_config::{AnalysisConfig, AppConfig, BiasWeights, Environment};
pub use article::{truncate_content, ArticleRecord, NewArticle, SentimentLabel, TRUNCATION_MARKER};
pub use config::{load_app_config, load_app_config_from_env};
pub use matchers::{default_matchers, load_matchers, MatcherCategory, MatcherConfig, MatchersFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read matchers file {path}: {source}")]
    MatchersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse matchers file: {0}")]
    MatchersFileParse(#[source] serde_yaml::Error),

    #[error("invalid matchers file: {0}")]
    MatchersValidation(String),
}
