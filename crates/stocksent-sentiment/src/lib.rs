//! Sentiment scoring for stock news tables.
//!
//! Two scorers annotate the aggregated news table: a rule-based lexicon
//! scorer over headlines and a model-backed classifier over descriptions.
//! [`Pipeline`] ties aggregation and both scorers together for one symbol.

pub mod classifier;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod scorer;

pub use classifier::{label_value, Classification, ClassifierScorer, TextClassifier};
pub use error::{PipelineError, SentimentError};
pub use inference::HttpClassifier;
pub use pipeline::{annotate_table, Pipeline, SourceSelection};
pub use scorer::{lexicon_score, LexiconScorer};
