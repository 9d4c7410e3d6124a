//! Yahoo Finance chart endpoint: display-name lookup and daily price bars.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::NewsError;
use crate::http::{build_client, endpoint, get_json};
use crate::types::PriceBar;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Client for the Yahoo Finance `v8/finance/chart` endpoint.
pub struct YahooClient {
    client: Client,
    base_url: Url,
}

impl YahooClient {
    /// Creates a client pointed at the production Yahoo Finance API.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, NewsError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`NewsError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, NewsError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: endpoint(base_url, "")?,
        })
    }

    /// Returns the company's long name, falling back to its short name and
    /// then to `symbol` itself when the chart metadata carries neither.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Http`] on network failure or timeout.
    /// - [`NewsError::Deserialize`] if the body is not a chart envelope.
    pub async fn lookup_display_name(&self, symbol: &str) -> Result<String, NewsError> {
        let url = self.chart_url(symbol, &[("range", "1d"), ("interval", "1d")])?;
        let chart = self.fetch_chart(url, symbol).await?;

        let name = chart
            .and_then(|r| r.meta.long_name.or(r.meta.short_name))
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if name.is_none() {
            tracing::debug!(symbol, "no display name in chart metadata; using symbol");
        }
        Ok(name.unwrap_or_else(|| symbol.to_string()))
    }

    /// Fetches daily OHLCV bars from `start` until now.
    ///
    /// Returns `Ok(None)` when the provider has no data for the symbol or
    /// range. Rows with any missing open/high/low/close value are skipped; a
    /// missing volume is recorded as zero.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Http`] on network failure or timeout.
    /// - [`NewsError::Deserialize`] if the body is not a chart envelope.
    pub async fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
    ) -> Result<Option<Vec<PriceBar>>, NewsError> {
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map_or(0, |dt| dt.and_utc().timestamp())
            .to_string();
        let period2 = Utc::now().timestamp().to_string();
        let url = self.chart_url(
            symbol,
            &[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
            ],
        )?;

        let bars = self
            .fetch_chart(url, symbol)
            .await?
            .map(to_bars)
            .unwrap_or_default();

        if bars.is_empty() {
            tracing::info!(symbol, %start, "no price data found");
            return Ok(None);
        }
        tracing::info!(symbol, count = bars.len(), "fetched daily bars");
        Ok(Some(bars))
    }

    fn chart_url(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Url, NewsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| NewsError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Fetches and decodes a chart envelope, returning its first result.
    ///
    /// Unknown symbols come back as `{"chart": {"result": null, ...}}`, which
    /// maps to `None`.
    async fn fetch_chart(&self, url: Url, symbol: &str) -> Result<Option<ChartResult>, NewsError> {
        let context = format!("yahoo chart(symbol={symbol})");
        let body = get_json(&self.client, url, &context).await?;
        let envelope: ChartEnvelope =
            serde_json::from_value(body).map_err(|e| NewsError::Deserialize { context, source: e })?;
        Ok(envelope.chart.result.and_then(|r| r.into_iter().next()))
    }
}

fn to_bars(result: ChartResult) -> Vec<PriceBar> {
    let quote = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(PriceBar {
                date,
                open: (*quote.open.get(i)?)?,
                high: (*quote.high.get(i)?)?,
                low: (*quote.low.get(i)?)?,
                close: (*quote.close.get(i)?)?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl crate::source::TickerLookup for YahooClient {
    async fn display_name(&self, symbol: &str) -> Result<String, NewsError> {
        self.lookup_display_name(symbol).await
    }
}
