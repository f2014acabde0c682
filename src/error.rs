//! Error types for the lead image pipeline.

use thiserror::Error;

/// Result type alias for lead image operations
pub type Result<T> = std::result::Result<T, LeadImageError>;

/// Errors that can occur while finding and materializing an article image
#[derive(Error, Debug)]
pub enum LeadImageError {
    /// Network failure, timeout, or non-2xx status after retries
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Malformed or undecodable document
    #[error("Failed to parse document: {0}")]
    Parse(String),

    /// The extraction chain produced no candidates at all
    #[error("No image candidates found")]
    NoCandidate,

    /// Candidates existed but none cleared the score floor or validation
    #[error("No image candidate cleared the minimum score (best score: {best_score})")]
    BelowThreshold { best_score: u8 },

    /// Image decode or encode failure
    #[error("Image codec error: {0}")]
    ImageCodec(String),

    /// Invalid URL provided
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A configured exclusion pattern failed to compile
    #[error("Invalid exclusion pattern: {0}")]
    InvalidPattern(String),

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LeadImageError {
    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<image::ImageError> for LeadImageError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageCodec(err.to_string())
    }
}
