//! Model-backed three-way sentiment classification over table columns.

use async_trait::async_trait;
use serde::Deserialize;
use stocksent_core::table::{Column, DESCRIPTION, FINBERT_SENTIMENT};
use stocksent_core::NewsTable;

use crate::error::SentimentError;

/// Column the classifier scorer reads when none is given.
pub const DEFAULT_SOURCE_COLUMN: &str = DESCRIPTION;

/// Texts per `classify_batch` call unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Top label for one input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Classification {
    pub label: String,
    #[serde(alias = "score")]
    pub confidence: f64,
}

/// A text classifier emitting `positive` / `negative` / `neutral` style labels.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, SentimentError>;

    /// Classifies `texts` in order, one result per input.
    ///
    /// The default implementation calls [`TextClassifier::classify`] once per
    /// text.
    async fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Classification>, SentimentError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.classify(text).await?);
        }
        Ok(out)
    }
}

/// Maps a classifier label to `+1`, `-1` or `0`. Case-insensitive; any label
/// other than positive or negative is neutral.
#[must_use]
pub fn label_value(label: &str) -> i8 {
    match label.trim().to_ascii_lowercase().as_str() {
        "positive" => 1,
        "negative" => -1,
        _ => 0,
    }
}

/// Scores table columns with a [`TextClassifier`].
pub struct ClassifierScorer<C> {
    classifier: C,
    batch_size: usize,
}

impl<C: TextClassifier> ClassifierScorer<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the number of texts sent per batch. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Scores one optional text value.
    ///
    /// Absent, empty and whitespace-only text scores `0` without calling the
    /// classifier.
    ///
    /// # Errors
    ///
    /// Propagates any classifier failure.
    pub async fn score(&self, text: Option<&str>) -> Result<i8, SentimentError> {
        match text.filter(|t| !t.trim().is_empty()) {
            Some(text) => Ok(label_value(&self.classifier.classify(text).await?.label)),
            None => Ok(0),
        }
    }

    /// Adds a `finbert_sentiment` column scored from `description`.
    ///
    /// # Errors
    ///
    /// See [`ClassifierScorer::annotate_column`].
    pub async fn annotate(&self, table: &NewsTable) -> Result<NewsTable, SentimentError> {
        self.annotate_column(table, DEFAULT_SOURCE_COLUMN).await
    }

    /// Returns a copy of `table` with a `finbert_sentiment` column scored from
    /// `source_column`.
    ///
    /// The column is validated before any text is classified. Non-blank texts
    /// are sent in batches; blank rows score `0` and are never sent. `table`
    /// itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Schema`] if the source column is missing or
    /// not text, and propagates classifier failures. A batch whose result
    /// count does not match its input count is a
    /// [`SentimentError::Classifier`] error.
    pub async fn annotate_column(
        &self,
        table: &NewsTable,
        source_column: &str,
    ) -> Result<NewsTable, SentimentError> {
        let texts = table.text_column(source_column)?;
        if table.has_column(FINBERT_SENTIMENT) {
            return Err(
                stocksent_core::SchemaError::DuplicateColumn(FINBERT_SENTIMENT.to_string()).into(),
            );
        }

        let pending: Vec<(usize, &str)> = texts
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_deref().map(|t| (i, t)))
            .filter(|(_, t)| !t.trim().is_empty())
            .collect();

        let mut labels = vec![0_i8; texts.len()];
        for chunk in pending.chunks(self.batch_size) {
            let inputs: Vec<&str> = chunk.iter().map(|&(_, t)| t).collect();
            let results = self.classifier.classify_batch(&inputs).await?;
            if results.len() != chunk.len() {
                return Err(SentimentError::Classifier(format!(
                    "classifier returned {} results for {} inputs",
                    results.len(),
                    chunk.len()
                )));
            }
            for (&(row, _), result) in chunk.iter().zip(&results) {
                labels[row] = label_value(&result.label);
            }
        }

        tracing::debug!(
            column = source_column,
            rows = texts.len(),
            classified = pending.len(),
            "classifier scoring complete"
        );

        Ok(table.with_column(FINBERT_SENTIMENT, Column::Label(labels))?)
    }
}
