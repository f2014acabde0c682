//! Image candidate data structures.
//!
//! This module defines [`ImageCandidate`], the unit every extractor produces and
//! the selector ranks, and [`SourceMethod`], the provenance tag that records which
//! strategy found it.
//!
//! ## Example
//!
//! ```rust
//! use leadimage::{ImageCandidate, SourceMethod};
//!
//! let candidate = ImageCandidate::new("https://cdn.example.com/hero.jpg", 87, SourceMethod::OpenGraph);
//! assert_eq!(candidate.source.as_str(), "opengraph");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a candidate image was discovered.
///
/// Serialized in snake_case, except `opengraph`; the serialized form matches
/// [`SourceMethod::as_str`] and is what ends up in the `source_method` field of
/// the output record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMethod {
    /// The page's declared main image, found through its metadata
    StructuredMain,
    /// An image embedded in the readable article body
    StructuredInline,
    /// The top image chosen by the heuristic full-document parse
    ParsedTop,
    /// Any other image in the body found by the heuristic parse
    ParsedInline,
    /// `<meta property="og:image">`
    #[serde(rename = "opengraph")]
    OpenGraph,
    /// `<meta name="twitter:image">`
    TwitterCard,
    /// The `image` field of a JSON-LD block
    Schema,
    /// A plain `<img>` element from the raw markup
    RawDom,
    /// The first `srcset` entry of a `<picture><source>`
    RawPicture,
}

impl SourceMethod {
    /// Score added on top of the base score for this provenance.
    ///
    /// The OpenGraph, Twitter card and schema bonuses live here and nowhere else,
    /// so each candidate receives its bonus exactly once.
    pub fn prior(self) -> i32 {
        match self {
            SourceMethod::StructuredMain => 30,
            SourceMethod::ParsedTop => 25,
            SourceMethod::StructuredInline => 15,
            SourceMethod::ParsedInline => 10,
            SourceMethod::RawDom | SourceMethod::RawPicture => 5,
            SourceMethod::OpenGraph => 25,
            SourceMethod::TwitterCard => 20,
            SourceMethod::Schema => 22,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceMethod::StructuredMain => "structured_main",
            SourceMethod::StructuredInline => "structured_inline",
            SourceMethod::ParsedTop => "parsed_top",
            SourceMethod::ParsedInline => "parsed_inline",
            SourceMethod::OpenGraph => "opengraph",
            SourceMethod::TwitterCard => "twitter_card",
            SourceMethod::Schema => "schema",
            SourceMethod::RawDom => "raw_dom",
            SourceMethod::RawPicture => "raw_picture",
        }
    }
}

impl fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored image URL found on an article page.
///
/// Candidates live only for the duration of one article's selection. The `url`
/// is always absolute and the `score` is always within `0..=100`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageCandidate {
    /// Absolute image URL, resolved against the article URL.
    pub url: String,

    /// Relevance score in `0..=100`.
    pub score: u8,

    /// Which strategy produced this candidate.
    pub source: SourceMethod,
}

impl ImageCandidate {
    /// Build a candidate, clamping the score into `0..=100`.
    pub fn new(url: impl Into<String>, score: u8, source: SourceMethod) -> Self {
        Self {
            url: url.into(),
            score: score.min(100),
            source,
        }
    }
}

/// Ordered candidates produced by a single extractor invocation.
pub type ExtractionResult = Vec<ImageCandidate>;

/// Push a candidate unless its URL is already present.
///
/// Returns `true` when the candidate was added.
pub(crate) fn push_unique(result: &mut ExtractionResult, candidate: ImageCandidate) -> bool {
    if result.iter().any(|existing| existing.url == candidate.url) {
        return false;
    }
    result.push(candidate);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_score() {
        let candidate = ImageCandidate::new("https://example.com/a.jpg", 250, SourceMethod::RawDom);
        assert_eq!(candidate.score, 100);
    }

    #[test]
    fn source_method_serializes_snake_case() {
        let json = serde_json::to_string(&SourceMethod::TwitterCard).unwrap();
        assert_eq!(json, "\"twitter_card\"");
        let back: SourceMethod = serde_json::from_str("\"structured_main\"").unwrap();
        assert_eq!(back, SourceMethod::StructuredMain);
    }

    #[test]
    fn serialized_form_matches_as_str() {
        let all = [
            SourceMethod::StructuredMain,
            SourceMethod::StructuredInline,
            SourceMethod::ParsedTop,
            SourceMethod::ParsedInline,
            SourceMethod::OpenGraph,
            SourceMethod::TwitterCard,
            SourceMethod::Schema,
            SourceMethod::RawDom,
            SourceMethod::RawPicture,
        ];
        for method in all {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
            let back: SourceMethod = serde_json::from_str(&json).unwrap();
            assert_eq!(back, method);
        }
    }

    #[test]
    fn meta_bonuses_are_in_the_prior_table() {
        assert_eq!(SourceMethod::OpenGraph.prior(), 25);
        assert_eq!(SourceMethod::TwitterCard.prior(), 20);
        assert_eq!(SourceMethod::Schema.prior(), 22);
    }

    #[test]
    fn push_unique_skips_duplicates() {
        let mut result = ExtractionResult::new();
        assert!(push_unique(
            &mut result,
            ImageCandidate::new("https://a.com/x.jpg", 60, SourceMethod::RawDom)
        ));
        assert!(!push_unique(
            &mut result,
            ImageCandidate::new("https://a.com/x.jpg", 90, SourceMethod::OpenGraph)
        ));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].score, 60);
    }
}
