use crate::config::ProviderConfig;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
enum FetchError {
    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Rate limits, server errors and transport failures are worth another
    /// attempt; any other 4xx is not.
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status(s) => *s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error(),
            FetchError::Transport(_) => true,
        }
    }
}

pub struct HttpClient {
    inner: reqwest::Client,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl HttpClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            inner,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    /// Delays of d, 2d, 4d, … (capped at 30s) with jitter, `max_retries` times.
    fn backoff(&self) -> impl Iterator<Item = Duration> + use<> {
        ExponentialBackoff::from_millis(2)
            .factor((self.retry_delay_ms / 2).max(1))
            .max_delay(Duration::from_secs(30))
            .map(jitter)
            .take(self.max_retries as usize)
    }

    /// Fetch a URL as text, retrying transient failures.
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        let action = || {
            debug!("GET {}", url);
            fetch_once(
                self.inner
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json"),
            )
        };

        let should_retry = |e: &FetchError| {
            let retry = e.is_retryable();
            if retry {
                warn!("GET {} failed ({}), retrying", url, e);
            }
            retry
        };

        RetryIf::spawn(self.backoff(), action, should_retry)
            .await
            .with_context(|| format!("GET {} failed", url))
    }
}

async fn fetch_once(request: reqwest::RequestBuilder) -> Result<String, FetchError> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(resp.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(FetchError::Status(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(FetchError::Status(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(!FetchError::Status(StatusCode::NOT_FOUND).is_retryable());
        assert!(!FetchError::Status(StatusCode::FORBIDDEN).is_retryable());
    }

    #[test]
    fn test_backoff_schedule_is_bounded() {
        let config = ProviderConfig {
            max_retries: 3,
            retry_delay_ms: 500,
            ..Default::default()
        };
        let client = HttpClient::new(&config).unwrap();
        let delays: Vec<Duration> = client.backoff().collect();
        assert_eq!(delays.len(), 3);
        assert!(delays.iter().all(|d| *d <= Duration::from_millis(2000)));
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let config = ProviderConfig { max_retries: 0, ..Default::default() };
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.backoff().count(), 0);
    }
}
