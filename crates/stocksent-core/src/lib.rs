//! Shared types for the stocksent workspace: configuration, credentials and
//! the column-oriented news table that flows through the pipeline.

pub mod app_config;
pub mod config;
pub mod credentials;
pub mod record;
pub mod table;

use thiserror::Error;

pub use app_config::{AppConfig, EmptyDayPolicy};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use credentials::{CredentialProvider, Credentials, API_KEY_APITUBE, API_KEY_NEWSAPI};
pub use record::NewsRecord;
pub use table::{Column, DedupKeep, NewsTable, SchemaError};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Every required secret that was absent or blank, in request order.
    #[error("missing required secret(s): {}", .0.join(", "))]
    MissingSecrets(Vec<String>),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
