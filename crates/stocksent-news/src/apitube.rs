//! Offset news adapter for the APITube `/v1/news/top-headlines` endpoint.

use std::collections::HashSet;

use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::Deserialize;
use stocksent_core::config::MAX_APITUBE_PAGE_SIZE;
use stocksent_core::NewsRecord;

use crate::error::NewsError;
use crate::http::{build_client, endpoint, get_json};
use crate::types::{FetchWindow, NewsBatch, ProviderAnomaly, RangeEnd};

const DEFAULT_BASE_URL: &str = "https://api.apitube.io/v1/";
const PROVIDER: &str = "apitube";

#[derive(Debug, Deserialize)]
struct ApiTubeItem {
    title: Option<String>,
    published_at: Option<String>,
    description: Option<String>,
}

/// Client for APITube headline search.
///
/// The provider is asked to include duplicates (`is_duplicate=true`) and the
/// client collapses them itself, keeping the first occurrence of each
/// headline in the provider's `published_at` order.
pub struct ApiTubeClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    page_size: u32,
    range_start: Option<NaiveDate>,
}

impl ApiTubeClient {
    /// Creates a client pointed at the production APITube API.
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
            endpoint: endpoint(base_url, "news/top-headlines")?,
            page_size: MAX_APITUBE_PAGE_SIZE,
            range_start: None,
        })
    }

    /// Page size used when fetched as a [`crate::NewsSource`].
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fixed range start used instead of the aggregation window's start.
    #[must_use]
    pub fn with_range_start(mut self, start: NaiveDate) -> Self {
        self.range_start = Some(start);
        self
    }

    /// Fetches up to `page_size` headlines mentioning `topic` between `from`
    /// and `to`, sorted by publish time.
    ///
    /// `page_size` is clamped to `1..=500`. A response with no `results`
    /// array yields an empty batch carrying a [`ProviderAnomaly`]; it is not
    /// an error. Untitled items are dropped and repeated headlines collapse
    /// to their first occurrence.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Http`] on network failure or timeout.
    /// - [`NewsError::Deserialize`] if the response body is not JSON.
    pub async fn fetch_range(
        &self,
        topic: &str,
        from: NaiveDate,
        to: RangeEnd,
        page_size: u32,
    ) -> Result<NewsBatch, NewsError> {
        let clamped = page_size.clamp(1, MAX_APITUBE_PAGE_SIZE);
        if clamped != page_size {
            tracing::warn!(
                provider = PROVIDER,
                requested = page_size,
                used = clamped,
                "page size out of range; clamped"
            );
        }

        let url = self.headlines_url(topic, from, to, clamped);
        let context = format!("{PROVIDER} top-headlines(from={from})");
        let body = get_json(&self.client, url, &context).await?;

        let Some(items) = body.get("results").and_then(serde_json::Value::as_array) else {
            let anomaly = ProviderAnomaly {
                provider: PROVIDER,
                field: "results",
                detail: error_detail(&body),
            };
            tracing::warn!(provider = PROVIDER, topic, anomaly = %anomaly, "no results in response");
            return Ok(NewsBatch {
                records: Vec::new(),
                anomaly: Some(anomaly),
                requests: 1,
            });
        };

        let records = dedup_first(
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<ApiTubeItem>(item.clone()).ok())
                .filter_map(|item| {
                    NewsRecord::new(item.title?, item.published_at, item.description)
                }),
        );

        tracing::info!(
            provider = PROVIDER,
            topic,
            received = items.len(),
            count = records.len(),
            "offset fetch complete"
        );
        Ok(NewsBatch {
            records,
            anomaly: None,
            requests: 1,
        })
    }

    fn headlines_url(&self, topic: &str, from: NaiveDate, to: RangeEnd, page_size: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("title", topic)
            .append_pair("api_key", &self.api_key)
            .append_pair("per_page", &page_size.to_string())
            .append_pair("published_at.start", &from.format("%Y-%m-%d").to_string())
            .append_pair("published_at.end", &to.as_query_value())
            .append_pair("is_duplicate", "true")
            .append_pair("sort_by", "published_at");
        url
    }
}

/// Keeps the first record for each distinct headline, preserving order.
fn dedup_first(records: impl Iterator<Item = NewsRecord>) -> Vec<NewsRecord> {
    let mut seen = HashSet::new();
    records
        .filter(|r| seen.insert(r.headline().to_string()))
        .collect()
}

/// Pulls a human-readable message out of an APITube error body, if any.
fn error_detail(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| {
            body.get("errors")
                .and_then(serde_json::Value::as_array)
                .and_then(|errs| errs.first())
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
        })
        .map(str::to_string)
}

#[async_trait::async_trait]
impl crate::source::NewsSource for ApiTubeClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch(&self, topic: &str, window: &FetchWindow) -> Result<NewsBatch, NewsError> {
        let from = self.range_start.unwrap_or(window.from);
        self.fetch_range(topic, from, window.to, self.page_size)
            .await
    }
}
