//! Shared domain types and configuration for SentiFlow.

pub mod app_config;
pub mod article;
pub mod config;
pub mod entities;
pub mod model;

pub use app_config::{AppConfig, Environment};
pub use article::{content_preview, NewArticle, MAX_CONTENT_PREVIEW};
pub use config::{load_app_config, load_app_config_from_env};
pub use entities::{load_entities, CategoryConfig, EntitiesFile, EntityConfig};
pub use model::{
    Article, ArticleId, Category, CategoryId, Entity, EntityId, QuerySpec, RawArticle,
    SentimentLabel, SentimentRecord, Tier,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sentiment label: {0}")]
    InvalidSentimentLabel(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read entities file {path}: {source}")]
    EntitiesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse entities file: {0}")]
    EntitiesFileParse(#[from] serde_yaml::Error),

    #[error("entities validation failed: {0}")]
    Validation(String),
}
