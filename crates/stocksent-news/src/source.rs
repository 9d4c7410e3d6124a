//! Seams between the aggregator and its external collaborators.

use async_trait::async_trait;

use crate::error::NewsError;
use crate::types::{FetchWindow, NewsBatch};

/// Resolves a ticker symbol to the human-readable name used as a news query.
#[async_trait]
pub trait TickerLookup: Send + Sync {
    /// Returns the display name for `symbol`.
    ///
    /// Implementations fall back to the symbol itself when the provider has
    /// no name for it.
    async fn display_name(&self, symbol: &str) -> Result<String, NewsError>;
}

/// A news provider adapter.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches normalized records about `topic` within `window`.
    async fn fetch(&self, topic: &str, window: &FetchWindow) -> Result<NewsBatch, NewsError>;
}
