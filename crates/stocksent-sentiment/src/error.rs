use stocksent_core::{ConfigError, SchemaError};
use stocksent_news::NewsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Failure of a full pipeline run. Nothing is returned when any stage fails.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("news collection failed: {0}")]
    News(#[from] NewsError),

    #[error("sentiment scoring failed: {0}")]
    Sentiment(#[from] SentimentError),
}
