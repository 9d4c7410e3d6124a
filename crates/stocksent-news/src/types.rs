use chrono::{Days, NaiveDate};
use serde::Serialize;
use stocksent_core::NewsRecord;
use thiserror::Error;

/// A provider response that lacked its expected top-level field.
///
/// Reported inside [`NewsBatch`] rather than returned as an error. The
/// chronological adapter stops its day loop on it; the offset adapter returns
/// an empty batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} response has no `{field}` field{}", .detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
pub struct ProviderAnomaly {
    pub provider: &'static str,
    pub field: &'static str,
    /// Provider-supplied message, when the body carried one.
    pub detail: Option<String>,
}

/// Records returned by one adapter call.
#[derive(Debug, Clone, Default)]
pub struct NewsBatch {
    pub records: Vec<NewsRecord>,
    pub anomaly: Option<ProviderAnomaly>,
    /// Number of HTTP requests issued to produce this batch.
    pub requests: usize,
}

/// Upper bound of a query range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// The provider's notion of "now"; resolved to today for day-based
    /// providers.
    Now,
    Date(NaiveDate),
}

impl RangeEnd {
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            RangeEnd::Now => today,
            RangeEnd::Date(d) => d,
        }
    }

    /// Query-string form: `NOW` or `YYYY-MM-DD`.
    #[must_use]
    pub fn as_query_value(self) -> String {
        match self {
            RangeEnd::Now => "NOW".to_string(),
            RangeEnd::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Time window handed to every news source during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub from: NaiveDate,
    pub to: RangeEnd,
}

impl FetchWindow {
    /// A window covering the last `weeks` weeks up to "now".
    ///
    /// The start saturates at [`NaiveDate::MIN`] when the look-back reaches
    /// past the calendar's range.
    #[must_use]
    pub fn lookback(weeks: u32, today: NaiveDate) -> Self {
        Self {
            from: today
                .checked_sub_days(Days::new(u64::from(weeks) * 7))
                .unwrap_or(NaiveDate::MIN),
            to: RangeEnd::Now,
        }
    }
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}
