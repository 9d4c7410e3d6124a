use thiserror::Error;

/// Errors returned by the news, ticker and price clients.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON the caller expected.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error(transparent)]
    Schema(#[from] stocksent_core::SchemaError),
}
