//! Multi-source news aggregation.

use stocksent_core::{DedupKeep, NewsTable};

use crate::error::NewsError;
use crate::source::{NewsSource, TickerLookup};
use crate::types::FetchWindow;

/// Drives every configured [`NewsSource`] for a symbol and merges the results
/// into one canonical `{headline, date, description}` table.
pub struct Aggregator<L> {
    lookup: L,
    sources: Vec<Box<dyn NewsSource>>,
    window: FetchWindow,
    cross_source_dedup: Option<DedupKeep>,
}

impl<L: TickerLookup> Aggregator<L> {
    /// Creates an aggregator with no sources.
    pub fn new(lookup: L, window: FetchWindow) -> Self {
        Self {
            lookup,
            sources: Vec::new(),
            window,
            cross_source_dedup: None,
        }
    }

    /// Adds a source. Sources are queried in the order they are added.
    #[must_use]
    pub fn with_source(mut self, source: impl NewsSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Collapses headlines repeated across sources after concatenation.
    /// Off by default: each source's rows are kept as returned.
    #[must_use]
    pub fn with_cross_source_dedup(mut self, keep: DedupKeep) -> Self {
        self.cross_source_dedup = Some(keep);
        self
    }

    #[must_use]
    pub fn window(&self) -> &FetchWindow {
        &self.window
    }

    /// Builds the news table for `symbol`.
    ///
    /// The symbol's display name is the query topic for every source; a blank
    /// name falls back to the symbol. Sources run sequentially. A
    /// [`crate::ProviderAnomaly`] is logged and does not fail the run.
    ///
    /// # Errors
    ///
    /// Propagates the first transport or decoding error from the lookup or any
    /// source. No partial table is returned in that case.
    pub async fn aggregate(&self, symbol: &str) -> Result<NewsTable, NewsError> {
        let name = self.lookup.display_name(symbol).await?;
        let topic = if name.trim().is_empty() {
            symbol.to_string()
        } else {
            name
        };
        tracing::info!(symbol, topic = %topic, sources = self.sources.len(), "aggregating news");

        let mut table = NewsTable::empty();
        for source in &self.sources {
            let batch = source.fetch(&topic, &self.window).await?;
            if let Some(anomaly) = &batch.anomaly {
                tracing::warn!(
                    source = source.name(),
                    symbol,
                    anomaly = %anomaly,
                    "source reported a malformed response"
                );
            }
            tracing::debug!(
                source = source.name(),
                count = batch.records.len(),
                requests = batch.requests,
                "source finished"
            );
            table = table.concat(NewsTable::from_records(batch.records))?;
        }

        if let Some(keep) = self.cross_source_dedup {
            let before = table.len();
            table = table.dedup_by_headline(keep)?;
            tracing::debug!(removed = before - table.len(), "cross-source dedup");
        }

        tracing::info!(symbol, rows = table.len(), "aggregation complete");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use stocksent_core::table::{CANONICAL_COLUMNS, DESCRIPTION, HEADLINE};
    use stocksent_core::NewsRecord;

    use super::*;
    use crate::types::{NewsBatch, ProviderAnomaly, RangeEnd};

    struct FixedName(&'static str);

    #[async_trait]
    impl TickerLookup for FixedName {
        async fn display_name(&self, _symbol: &str) -> Result<String, NewsError> {
            Ok(self.0.to_string())
        }
    }

    /// Returns canned records and records the topic it was asked for.
    struct Canned {
        records: Vec<NewsRecord>,
        anomaly: Option<ProviderAnomaly>,
        seen_topic: Mutex<Option<String>>,
    }

    impl Canned {
        fn new(records: Vec<NewsRecord>) -> Self {
            Self {
                records,
                anomaly: None,
                seen_topic: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl NewsSource for Arc<Canned> {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn fetch(&self, topic: &str, _window: &FetchWindow) -> Result<NewsBatch, NewsError> {
            *self.seen_topic.lock().unwrap() = Some(topic.to_string());
            Ok(NewsBatch {
                records: self.records.clone(),
                anomaly: self.anomaly.clone(),
                requests: 1,
            })
        }
    }

    fn window() -> FetchWindow {
        FetchWindow {
            from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            to: RangeEnd::Now,
        }
    }

    fn record(headline: &str, description: Option<&str>) -> NewsRecord {
        NewsRecord::new(headline, Some("2025-01-01T00:00:00Z".into()), description.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn concatenates_sources_in_order_with_canonical_schema() {
        let a = Arc::new(Canned::new(vec![record("A", Some("desc"))]));
        let b = Arc::new(Canned::new(vec![record("B", None), record("A", None)]));
        let agg = Aggregator::new(FixedName("Acme Corp"), window())
            .with_source(a.clone())
            .with_source(b);

        let table = agg.aggregate("ACME").await.unwrap();
        assert_eq!(table.column_names(), CANONICAL_COLUMNS.to_vec());
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.text_column(DESCRIPTION).unwrap(),
            &[Some("desc".to_string()), None, None]
        );
        assert_eq!(a.seen_topic.lock().unwrap().as_deref(), Some("Acme Corp"));
    }

    #[tokio::test]
    async fn blank_display_name_falls_back_to_symbol() {
        let src = Arc::new(Canned::new(vec![]));
        let agg = Aggregator::new(FixedName("  "), window()).with_source(src.clone());
        let table = agg.aggregate("ACME").await.unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names(), CANONICAL_COLUMNS.to_vec());
        assert_eq!(src.seen_topic.lock().unwrap().as_deref(), Some("ACME"));
    }

    #[tokio::test]
    async fn anomaly_does_not_fail_aggregation() {
        let mut canned = Canned::new(vec![]);
        canned.anomaly = Some(ProviderAnomaly {
            provider: "canned",
            field: "results",
            detail: None,
        });
        let agg = Aggregator::new(FixedName("Acme"), window())
            .with_source(Arc::new(canned))
            .with_source(Arc::new(Canned::new(vec![record("B", None)])));
        let table = agg.aggregate("ACME").await.unwrap();
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn cross_source_dedup_keeps_first_when_enabled() {
        let agg = Aggregator::new(FixedName("Acme"), window())
            .with_source(Arc::new(Canned::new(vec![record("A", Some("one"))])))
            .with_source(Arc::new(Canned::new(vec![record("A", Some("two"))])))
            .with_cross_source_dedup(DedupKeep::First);
        let table = agg.aggregate("ACME").await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.text_column(HEADLINE).unwrap(), &[Some("A".to_string())]);
        assert_eq!(
            table.text_column(DESCRIPTION).unwrap(),
            &[Some("one".to_string())]
        );
    }
}
