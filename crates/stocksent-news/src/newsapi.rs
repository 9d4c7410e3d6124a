//! Chronological news adapter for the NewsAPI `/v2/everything` endpoint.
//!
//! The provider is queried one calendar day at a time. There is no
//! continuation token: a response without an `articles` array is the only
//! signal that the window cannot be continued.

use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::Deserialize;
use stocksent_core::{EmptyDayPolicy, NewsRecord};

use crate::error::NewsError;
use crate::http::{build_client, endpoint, get_json};
use crate::types::{NewsBatch, ProviderAnomaly};

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/";
const PROVIDER: &str = "newsapi";

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    description: Option<String>,
}

/// Outcome of a single day's request.
enum DayPage {
    Articles(Vec<NewsRecord>),
    Anomaly(ProviderAnomaly),
}

/// Client for the NewsAPI `everything` search.
///
/// Use [`NewsApiClient::new`] for production or
/// [`NewsApiClient::with_base_url`] to point at a mock server in tests.
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    empty_day_policy: EmptyDayPolicy,
}

impl NewsApiClient {
    /// Creates a client pointed at the production NewsAPI.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, NewsError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`NewsError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, NewsError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            api_key: api_key.to_owned(),
            endpoint: endpoint(base_url, "everything")?,
            empty_day_policy: EmptyDayPolicy::default(),
        })
    }

    /// Sets how a well-formed but empty day is handled.
    #[must_use]
    pub fn with_empty_day_policy(mut self, policy: EmptyDayPolicy) -> Self {
        self.empty_day_policy = policy;
        self
    }

    /// Fetches articles about `topic` for every day in `from..=to`.
    ///
    /// One request is issued per day, in ascending order. A response with no
    /// `articles` array stops the loop: records gathered so far are returned
    /// together with the anomaly, and later days are never queried. A day
    /// with an empty `articles` array is skipped under
    /// [`EmptyDayPolicy::Skip`] and ends the loop under
    /// [`EmptyDayPolicy::Stop`]. Articles without a title are dropped.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Http`] on network failure or timeout.
    /// - [`NewsError::Deserialize`] if a response body is not JSON.
    pub async fn fetch_window(
        &self,
        topic: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<NewsBatch, NewsError> {
        let mut batch = NewsBatch::default();

        for day in from.iter_days().take_while(|d| *d <= to) {
            let url = self.everything_url(topic, day);
            let context = format!("{PROVIDER} everything(day={day})");
            let body = get_json(&self.client, url, &context).await?;
            batch.requests += 1;

            match parse_day(&body) {
                DayPage::Anomaly(anomaly) => {
                    tracing::warn!(
                        provider = PROVIDER,
                        topic,
                        %day,
                        anomaly = %anomaly,
                        "stopping day iteration; remaining days abandoned"
                    );
                    batch.anomaly = Some(anomaly);
                    break;
                }
                DayPage::Articles(records) if records.is_empty() => {
                    tracing::debug!(provider = PROVIDER, topic, %day, "no articles for day");
                    if self.empty_day_policy == EmptyDayPolicy::Stop {
                        break;
                    }
                }
                DayPage::Articles(records) => {
                    tracing::debug!(
                        provider = PROVIDER,
                        topic,
                        %day,
                        count = records.len(),
                        "collected articles"
                    );
                    batch.records.extend(records);
                }
            }
        }

        tracing::info!(
            provider = PROVIDER,
            topic,
            requests = batch.requests,
            count = batch.records.len(),
            "chronological fetch complete"
        );
        Ok(batch)
    }

    /// Builds the request URL for a single day with percent-encoded parameters.
    fn everything_url(&self, topic: &str, day: NaiveDate) -> Url {
        let day = day.format("%Y-%m-%d").to_string();
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", topic)
            .append_pair("from", &day)
            .append_pair("to", &day)
            .append_pair("sortBy", "popularity")
            .append_pair("apiKey", &self.api_key);
        url
    }
}

/// Classifies one day's response body.
///
/// Untitled or malformed items count as absent, so a day whose items are all
/// untitled is an empty day rather than an anomaly.
fn parse_day(body: &serde_json::Value) -> DayPage {
    let Some(items) = body.get("articles").and_then(serde_json::Value::as_array) else {
        let detail = body
            .get("message")
            .or_else(|| body.get("code"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        return DayPage::Anomaly(ProviderAnomaly {
            provider: PROVIDER,
            field: "articles",
            detail,
        });
    };

    let records = items
        .iter()
        .filter_map(|item| serde_json::from_value::<NewsApiArticle>(item.clone()).ok())
        .filter_map(|a| NewsRecord::new(a.title?, a.published_at, a.description))
        .collect();
    DayPage::Articles(records)
}

#[async_trait::async_trait]
impl crate::source::NewsSource for NewsApiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(
        &self,
        topic: &str,
        window: &crate::types::FetchWindow,
    ) -> Result<NewsBatch, NewsError> {
        let today = chrono::Utc::now().date_naive();
        self.fetch_window(topic, window.from, window.to.resolve(today))
            .await
    }
}
