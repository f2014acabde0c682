//! Configuration options for the image pipeline.
//!
//! This module provides [`ScraperOptions`] and [`ScraperOptionsBuilder`]. Options
//! are read once at startup and shared read-only by every component; each
//! component takes what it needs in its constructor.
//!
//! ## Example
//!
//! ```rust
//! use leadimage::ScraperOptions;
//!
//! // Using default options
//! let options = ScraperOptions::default();
//! assert_eq!(options.min_acceptable_score, 40);
//!
//! // Using builder for custom options
//! let options = ScraperOptions::builder()
//!     .request_timeout_secs(10)
//!     .concurrency(8)
//!     .min_acceptable_score(50)
//!     .build();
//! assert_eq!(options.concurrency, 8);
//! ```
//!
//! Options can also be loaded from a JSON file; missing keys keep their defaults:
//!
//! ```rust,no_run
//! use leadimage::ScraperOptions;
//!
//! let options = ScraperOptions::from_json_file("leadimage.json")?;
//! # Ok::<(), leadimage::LeadImageError>(())
//! ```

use crate::constants;
use crate::error::{LeadImageError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration options for the image pipeline.
///
/// Covers the network contract (timeouts, retries), the filter tables, the
/// scoring and chain thresholds, and the output encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperOptions {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Timeout for page and full image downloads, in seconds.
    ///
    /// Default: `30`
    pub request_timeout_secs: u64,

    /// Retries after the first attempt on retryable statuses and connection failures.
    ///
    /// Default: `3`
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between retries, in milliseconds.
    ///
    /// The n-th retry waits `retry_backoff_ms * 2^n`.
    ///
    /// Default: `1000`
    pub retry_backoff_ms: u64,

    /// HTTP statuses that trigger a retry.
    ///
    /// Default: `[429, 500, 502, 503, 504]`
    pub retry_statuses: Vec<u16>,

    /// Timeout for the validator's HEAD probe, in seconds.
    ///
    /// Default: `10`
    pub head_timeout_secs: u64,

    /// Timeout for the validator's partial GET, in seconds.
    ///
    /// Default: `15`
    pub probe_timeout_secs: u64,

    /// Number of leading bytes the validator reads to find image dimensions.
    ///
    /// Default: `10240`
    pub probe_bytes: usize,

    /// Minimum acceptable image width in pixels.
    ///
    /// Default: `100`
    pub min_image_width: u32,

    /// Minimum acceptable image height in pixels.
    ///
    /// Default: `100`
    pub min_image_height: u32,

    /// Largest accepted download, in megabytes.
    ///
    /// Default: `10`
    pub max_file_size_mb: u64,

    /// Candidates scoring below this are never selected.
    ///
    /// Default: `40`
    pub min_acceptable_score: u8,

    /// The heuristic parse only runs while the best score is below this.
    ///
    /// Default: `80`
    pub structured_threshold: u8,

    /// The raw markup pass only runs while the best score is below this.
    ///
    /// Default: `70`
    pub parse_threshold: u8,

    /// JPEG quality of the normalized output (1-100).
    ///
    /// Default: `90`
    pub jpeg_quality: u8,

    /// Number of articles processed concurrently.
    ///
    /// Default: `4`
    pub concurrency: usize,

    /// Hard deadline for processing a single article, in seconds.
    ///
    /// Default: `180`
    pub article_deadline_secs: u64,

    /// File extensions (without dot) an image URL may carry.
    pub allowed_extensions: Vec<String>,

    /// Case-insensitive regex fragments that exclude a URL, alt text or class list.
    pub exclude_patterns: Vec<String>,

    /// Hosts (and their subdomains) that only serve tracking or ads.
    pub tracking_domains: Vec<String>,

    /// URL substrings that mark tracking endpoints.
    pub tracking_patterns: Vec<String>,

    /// Query string markers of tracking parameters.
    pub tracking_params: Vec<String>,

    /// Host prefixes that look like image hosts (`cdn.`, `img.` ...).
    pub image_host_prefixes: Vec<String>,

    /// Hosts known to serve images from extension-less paths.
    pub known_image_hosts: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for ScraperOptions {
    fn default() -> Self {
        Self {
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            retry_attempts: 3,
            retry_backoff_ms: 1000,
            retry_statuses: vec![429, 500, 502, 503, 504],
            head_timeout_secs: 10,
            probe_timeout_secs: 15,
            probe_bytes: 10 * 1024,
            min_image_width: 100,
            min_image_height: 100,
            max_file_size_mb: 10,
            min_acceptable_score: 40,
            structured_threshold: 80,
            parse_threshold: 70,
            jpeg_quality: 90,
            concurrency: 4,
            article_deadline_secs: 180,
            allowed_extensions: strings(constants::ALLOWED_EXTENSIONS),
            exclude_patterns: strings(constants::EXCLUDE_PATTERNS),
            tracking_domains: strings(constants::TRACKING_DOMAINS),
            tracking_patterns: strings(constants::TRACKING_PATTERNS),
            tracking_params: strings(constants::TRACKING_PARAMS),
            image_host_prefixes: strings(constants::IMAGE_HOST_PREFIXES),
            known_image_hosts: strings(constants::KNOWN_IMAGE_HOSTS),
        }
    }
}

impl ScraperOptions {
    /// Creates a new builder for ScraperOptions
    pub fn builder() -> ScraperOptionsBuilder {
        ScraperOptionsBuilder::default()
    }

    /// Load options from a JSON file, keeping defaults for absent keys.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&raw)
            .map_err(|e| LeadImageError::Config(format!("{}: {}", path.display(), e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject option combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(LeadImageError::Config("concurrency must be at least 1".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(LeadImageError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.min_acceptable_score > 100 {
            return Err(LeadImageError::Config(
                "min_acceptable_score must be within 0..=100".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn head_timeout(&self) -> Duration {
        Duration::from_secs(self.head_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn article_deadline(&self) -> Duration {
        Duration::from_secs(self.article_deadline_secs)
    }

    /// Largest accepted download in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// Builder for [`ScraperOptions`].
///
/// ## Example
///
/// ```rust
/// use leadimage::ScraperOptions;
///
/// let options = ScraperOptions::builder()
///     .retry_attempts(1)
///     .retry_backoff_ms(10)
///     .jpeg_quality(85)
///     .build();
/// assert_eq!(options.jpeg_quality, 85);
/// ```
#[derive(Default)]
pub struct ScraperOptionsBuilder {
    user_agent: Option<String>,
    request_timeout_secs: Option<u64>,
    retry_attempts: Option<u32>,
    retry_backoff_ms: Option<u64>,
    min_acceptable_score: Option<u8>,
    structured_threshold: Option<u8>,
    parse_threshold: Option<u8>,
    jpeg_quality: Option<u8>,
    concurrency: Option<usize>,
    article_deadline_secs: Option<u64>,
    known_image_hosts: Option<Vec<String>>,
}

impl ScraperOptionsBuilder {
    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the download timeout in seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Set the number of retries
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Set the base backoff delay in milliseconds
    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = Some(ms);
        self
    }

    /// Set the minimum acceptable score
    pub fn min_acceptable_score(mut self, score: u8) -> Self {
        self.min_acceptable_score = Some(score);
        self
    }

    /// Set the score that skips the heuristic parse
    pub fn structured_threshold(mut self, score: u8) -> Self {
        self.structured_threshold = Some(score);
        self
    }

    /// Set the score that skips the raw markup pass
    pub fn parse_threshold(mut self, score: u8) -> Self {
        self.parse_threshold = Some(score);
        self
    }

    /// Set the JPEG quality
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    /// Set the number of concurrent articles
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Set the per-article deadline in seconds
    pub fn article_deadline_secs(mut self, secs: u64) -> Self {
        self.article_deadline_secs = Some(secs);
        self
    }

    /// Replace the list of known extension-less image hosts
    pub fn known_image_hosts(mut self, hosts: Vec<String>) -> Self {
        self.known_image_hosts = Some(hosts);
        self
    }

    /// Build the ScraperOptions
    pub fn build(self) -> ScraperOptions {
        let defaults = ScraperOptions::default();
        ScraperOptions {
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            retry_attempts: self.retry_attempts.unwrap_or(defaults.retry_attempts),
            retry_backoff_ms: self.retry_backoff_ms.unwrap_or(defaults.retry_backoff_ms),
            min_acceptable_score: self
                .min_acceptable_score
                .unwrap_or(defaults.min_acceptable_score),
            structured_threshold: self
                .structured_threshold
                .unwrap_or(defaults.structured_threshold),
            parse_threshold: self.parse_threshold.unwrap_or(defaults.parse_threshold),
            jpeg_quality: self.jpeg_quality.unwrap_or(defaults.jpeg_quality),
            concurrency: self.concurrency.unwrap_or(defaults.concurrency),
            article_deadline_secs: self
                .article_deadline_secs
                .unwrap_or(defaults.article_deadline_secs),
            known_image_hosts: self.known_image_hosts.unwrap_or(defaults.known_image_hosts),
            ..defaults
        }
    }
}
