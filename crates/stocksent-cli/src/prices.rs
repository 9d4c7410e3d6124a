//! `stocksent prices` command handler.

use chrono::{NaiveDate, Utc};
use stocksent_core::AppConfig;
use stocksent_news::{FetchWindow, YahooClient};

/// Prints daily bars for `symbol` from `start` (or the configured look-back
/// start) to today.
///
/// # Errors
///
/// Returns an error if the request fails or no bars exist for the range.
pub(crate) async fn run_prices(
    config: &AppConfig,
    symbol: &str,
    start: Option<NaiveDate>,
    pretty: bool,
) -> anyhow::Result<()> {
    let symbol = symbol.trim().to_uppercase();
    let start = start.unwrap_or_else(|| {
        FetchWindow::lookback(config.lookback_weeks, Utc::now().date_naive()).from
    });

    let client = YahooClient::new(config.request_timeout_secs, &config.user_agent)?;
    let Some(bars) = client.daily_bars(&symbol, start).await? else {
        anyhow::bail!("no price data for {symbol} since {start}");
    };

    tracing::info!(symbol = %symbol, bars = bars.len(), "fetched price history");
    crate::print_json(&bars, pretty)
}
