//! HTTP client for fetching search-results and job-detail pages, with
//! retry-with-backoff on transient failures.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Too many redirects")]
    TooManyRedirects,
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: "fetchbox-scraper/0.1".to_string(),
        }
    }
}

pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetches a page body with up to `max_retries` attempts and
    /// exponential backoff (1s, 2s, 4s, ...). A failure on the final
    /// attempt propagates to the caller, which aborts the remaining
    /// pages for that title but continues to the next one.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.get_once(url).await {
                Ok(body) => {
                    if attempts > 1 {
                        debug!(url, attempts, "fetch succeeded after retry");
                    }
                    return Ok(body);
                }
                Err(err) => {
                    if attempts >= self.config.max_retries {
                        warn!(url, attempts, %err, "fetch failed after retries");
                        return Err(err);
                    }
                    warn!(url, attempts, %err, "fetch failed, retrying");
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempts - 1))).await;
                }
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_redirect() {
                FetchError::TooManyRedirects
            } else {
                FetchError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 3);
    }
}
