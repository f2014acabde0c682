//! HTTP fetcher with timeout and retry.
//!
//! Wraps a `reqwest::Client` configured with a fixed `User-Agent`. Requests are
//! retried with exponential backoff on the configured retryable statuses and on
//! connection-level failures. Every failure is converted into
//! [`LeadImageError::Fetch`]; callers decide what "this fetch failed" means.

use crate::error::{LeadImageError, Result};
use crate::options::ScraperOptions;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

/// Status and size reported by a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadInfo {
    pub status: u16,
    pub content_length: Option<u64>,
}

/// HTTP client shared by the extractors, the validator and the normalizer.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    retry_attempts: u32,
    retry_backoff: Duration,
    retry_statuses: Vec<u16>,
    max_body_bytes: u64,
}

impl Fetcher {
    pub fn new(options: &ScraperOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| LeadImageError::fetch("<client>", e))?;

        Ok(Self {
            client,
            retry_attempts: options.retry_attempts,
            retry_backoff: Duration::from_millis(options.retry_backoff_ms),
            retry_statuses: options.retry_statuses.clone(),
            max_body_bytes: options.max_file_size_bytes(),
        })
    }

    /// Download a full response body of at most `max_file_size_mb`.
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let response = self
            .send_with_retry(url, || self.client.get(url).timeout(timeout))
            .await?;
        let mut response = require_success(url, response)?;

        let too_large = || {
            LeadImageError::fetch(url, format!("body exceeds {} bytes", self.max_body_bytes))
        };
        if response.content_length().map_or(false, |len| len > self.max_body_bytes) {
            return Err(too_large());
        }

        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LeadImageError::fetch(url, e))?
        {
            if (data.len() + chunk.len()) as u64 > self.max_body_bytes {
                return Err(too_large());
            }
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    /// Download a page as text.
    pub async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .send_with_retry(url, || self.client.get(url).timeout(timeout))
            .await?;
        let response = require_success(url, response)?;
        response
            .text()
            .await
            .map_err(|e| LeadImageError::fetch(url, e))
    }

    /// Issue a HEAD request. A non-2xx status is reported, not treated as an error.
    pub async fn head(&self, url: &str, timeout: Duration) -> Result<HeadInfo> {
        let response = self
            .send_with_retry(url, || self.client.head(url).timeout(timeout))
            .await?;
        // reqwest reports a zero-length body for HEAD, so read the header itself.
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        Ok(HeadInfo {
            status: response.status().as_u16(),
            content_length,
        })
    }

    /// Read at most about `limit` leading bytes of a response body.
    pub async fn fetch_prefix(&self, url: &str, limit: usize, timeout: Duration) -> Result<Vec<u8>> {
        let response = self
            .send_with_retry(url, || self.client.get(url).timeout(timeout))
            .await?;
        let mut response = require_success(url, response)?;

        let mut data = Vec::with_capacity(limit.min(64 * 1024));
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LeadImageError::fetch(url, e))?
        {
            data.extend_from_slice(&chunk);
            if data.len() >= limit {
                break;
            }
        }
        Ok(data)
    }

    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            match build().send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if self.retry_statuses.contains(&status) && attempt < self.retry_attempts {
                        debug!(url, status, attempt, "retrying after retryable status");
                        self.backoff(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    let transient = e.is_connect() || e.is_timeout() || e.is_request();
                    if transient && attempt < self.retry_attempts {
                        debug!(url, attempt, error = %e, "retrying after connection failure");
                        self.backoff(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(LeadImageError::fetch(url, e));
                }
            }
        }
    }

    async fn backoff(&self, attempt: u32) {
        let delay = self.retry_backoff * 2u32.saturating_pow(attempt);
        tokio::time::sleep(delay).await;
    }
}

fn require_success(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(LeadImageError::fetch(url, format!("HTTP {}", status.as_u16())))
    }
}
