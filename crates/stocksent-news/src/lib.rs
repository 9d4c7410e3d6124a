//! News retrieval for stock symbols.
//!
//! Two provider adapters normalize NewsAPI (queried day by day) and APITube
//! (queried once over a date range) into [`stocksent_core::NewsRecord`]s. The
//! [`Aggregator`] resolves a symbol's display name and concatenates every
//! source's output into one [`stocksent_core::NewsTable`]. [`YahooClient`]
//! provides the display-name lookup and daily price bars.

pub mod aggregator;
pub mod apitube;
pub mod error;
pub mod newsapi;
pub mod source;
pub mod types;
pub mod yahoo;

mod http;

pub use aggregator::Aggregator;
pub use apitube::ApiTubeClient;
pub use error::NewsError;
pub use newsapi::NewsApiClient;
pub use source::{NewsSource, TickerLookup};
pub use types::{FetchWindow, NewsBatch, PriceBar, ProviderAnomaly, RangeEnd};
pub use yahoo::YahooClient;
