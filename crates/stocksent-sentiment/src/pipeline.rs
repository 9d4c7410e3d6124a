//! Sentiment pipeline orchestration.

use chrono::Utc;
use stocksent_core::{AppConfig, CredentialProvider, NewsTable, API_KEY_APITUBE, API_KEY_NEWSAPI};
use stocksent_news::{
    Aggregator, ApiTubeClient, FetchWindow, NewsApiClient, TickerLookup, YahooClient,
};

use crate::classifier::{ClassifierScorer, TextClassifier};
use crate::error::{PipelineError, SentimentError};
use crate::inference::HttpClassifier;
use crate::scorer::LexiconScorer;

/// Which news providers a pipeline queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceSelection {
    #[default]
    All,
    NewsApi,
    ApiTube,
}

impl SourceSelection {
    /// Secret names the selected providers need.
    #[must_use]
    pub fn required_secrets(self) -> &'static [&'static str] {
        match self {
            SourceSelection::All => &[API_KEY_NEWSAPI, API_KEY_APITUBE],
            SourceSelection::NewsApi => &[API_KEY_NEWSAPI],
            SourceSelection::ApiTube => &[API_KEY_APITUBE],
        }
    }
}

/// Adds both sentiment columns to `table`: `sentiment` from `headline` and
/// `finbert_sentiment` from `description`.
///
/// `table` is not modified; on error nothing is returned.
///
/// # Errors
///
/// Returns [`SentimentError::Schema`] if a source column is missing, and
/// propagates classifier failures.
pub async fn annotate_table<C: TextClassifier>(
    table: &NewsTable,
    lexicon: &LexiconScorer,
    classifier: &ClassifierScorer<C>,
) -> Result<NewsTable, SentimentError> {
    let with_lexicon = lexicon.annotate(table)?;
    classifier.annotate(&with_lexicon).await
}

/// Fetches news for a symbol and scores it.
pub struct Pipeline<L, C> {
    aggregator: Aggregator<L>,
    lexicon: LexiconScorer,
    classifier: ClassifierScorer<C>,
}

impl Pipeline<YahooClient, HttpClassifier> {
    /// Builds the production pipeline: Yahoo display-name lookup, the
    /// selected news providers and the HTTP classifier.
    ///
    /// Secrets are resolved up front, so a missing key fails here before any
    /// network request.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] listing every missing secret, or an
    /// error if an HTTP client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        credentials: &CredentialProvider,
        sources: SourceSelection,
    ) -> Result<Self, PipelineError> {
        let secrets = credentials.resolve(sources.required_secrets())?;
        let timeout = config.request_timeout_secs;
        let ua = config.user_agent.as_str();

        let window = FetchWindow::lookback(config.lookback_weeks, Utc::now().date_naive());
        let mut aggregator = Aggregator::new(YahooClient::new(timeout, ua)?, window);

        if let Some(key) = secrets.get(API_KEY_NEWSAPI) {
            aggregator = aggregator.with_source(
                NewsApiClient::new(key, timeout, ua)?
                    .with_empty_day_policy(config.empty_day_policy),
            );
        }
        if let Some(key) = secrets.get(API_KEY_APITUBE) {
            aggregator = aggregator.with_source(
                ApiTubeClient::new(key, timeout, ua)?
                    .with_page_size(config.apitube_page_size)
                    .with_range_start(config.apitube_start_date),
            );
        }

        let classifier = HttpClassifier::new(
            &config.classifier_url,
            config.classifier_token.clone(),
            timeout,
            ua,
        )?;

        tracing::debug!(?sources, window = ?aggregator.window(), "pipeline configured");

        Ok(Self::new(
            aggregator,
            ClassifierScorer::new(classifier).with_batch_size(config.classifier_batch_size),
        ))
    }
}

impl<L: TickerLookup, C: TextClassifier> Pipeline<L, C> {
    pub fn new(aggregator: Aggregator<L>, classifier: ClassifierScorer<C>) -> Self {
        Self {
            aggregator,
            lexicon: LexiconScorer::new(),
            classifier,
        }
    }

    /// Runs the full pipeline for one symbol: aggregate, then score.
    ///
    /// Returns the canonical table plus `sentiment` and `finbert_sentiment`.
    ///
    /// # Errors
    ///
    /// Any stage failure fails the run with no partial output.
    pub async fn run(&self, symbol: &str) -> Result<NewsTable, PipelineError> {
        tracing::info!(symbol, "pipeline started");
        let table = self.aggregator.aggregate(symbol).await?;
        let scored = self.score_table(&table).await?;
        tracing::info!(symbol, rows = scored.len(), "pipeline complete");
        Ok(scored)
    }

    /// Scores an already-aggregated table.
    ///
    /// # Errors
    ///
    /// See [`annotate_table`].
    pub async fn score_table(&self, table: &NewsTable) -> Result<NewsTable, PipelineError> {
        Ok(annotate_table(table, &self.lexicon, &self.classifier).await?)
    }
}
