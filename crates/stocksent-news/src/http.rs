//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::NewsError;

/// Builds a `reqwest::Client` with a per-request timeout and user agent.
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, NewsError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `base_url` and resolves `path` against it.
///
/// The base is normalised to end with exactly one slash so that `path` is
/// appended rather than replacing the last segment.
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, NewsError> {
    let invalid = |reason: String| NewsError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason,
    };
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    base.join(path).map_err(|e| invalid(e.to_string()))
}

/// Sends a GET request and parses the body as JSON regardless of HTTP status.
///
/// Providers report quota and auth failures as JSON bodies with non-2xx
/// statuses, so status handling is left to the caller's shape checks.
/// `context` names the call in errors; it must not contain the URL, which
/// carries the API key.
///
/// # Errors
///
/// Returns [`NewsError::Http`] on transport failure or timeout and
/// [`NewsError::Deserialize`] if the body is not JSON.
pub(crate) async fn get_json(
    client: &Client,
    url: Url,
    context: &str,
) -> Result<serde_json::Value, NewsError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(reqwest::Error::without_url)?;
    let status = response.status();
    let body = response.text().await.map_err(reqwest::Error::without_url)?;
    if !status.is_success() {
        tracing::debug!(context, status = status.as_u16(), "provider returned non-2xx status");
    }
    serde_json::from_str(&body).map_err(|e| NewsError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
