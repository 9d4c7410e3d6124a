//! HTTP client for a hosted text-classification model.
//!
//! Speaks the Hugging Face inference protocol: `POST {"inputs": [...]}` and a
//! JSON array of predictions back, one per input. Each prediction is either a
//! single `{label, score}` object or a ranked list of them.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, TextClassifier};
use crate::error::SentimentError;

/// Classifier backed by an HTTP inference endpoint.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a [&'a str],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Prediction {
    Ranked(Vec<Classification>),
    Top(Classification),
}

impl Prediction {
    fn top(self) -> Option<Classification> {
        match self {
            Prediction::Top(c) => Some(c),
            Prediction::Ranked(all) => all
                .into_iter()
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence)),
        }
    }
}

impl HttpClassifier {
    /// Creates a client for the model at `url`. `token` is sent as a bearer
    /// token when present.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(
        url: &str,
        token: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            token,
        })
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Classification>, SentimentError> {
        let mut builder = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { inputs: texts });
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::Classifier(format!(
                "classifier returned status {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let predictions: Vec<Prediction> = response.json().await.map_err(|e| {
            SentimentError::Classifier(format!("classifier response parse error: {e}"))
        })?;

        if predictions.len() != texts.len() {
            return Err(SentimentError::Classifier(format!(
                "classifier returned {} predictions for {} inputs",
                predictions.len(),
                texts.len()
            )));
        }

        predictions
            .into_iter()
            .map(|p| {
                p.top()
                    .ok_or_else(|| SentimentError::Classifier("empty prediction list".into()))
            })
            .collect()
    }
}

#[async_trait]
impl TextClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, SentimentError> {
        self.request(&[text])
            .await?
            .pop()
            .ok_or_else(|| SentimentError::Classifier("no prediction returned".into()))
    }

    async fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Classification>, SentimentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(count = texts.len(), "classifying batch");
        self.request(texts).await
    }
}
