//! Candidate extraction strategies.
//!
//! Each strategy implements [`ImageExtractor`]: given an article URL it fetches
//! the page and returns the scored, filtered candidates it found. A failed fetch
//! or an unusable page is never an error here; it logs a warning and yields an
//! empty result so the next strategy in the [`ExtractionChain`] can try.
//!
//! Every strategy also offers a synchronous `extract_from_html` so the parsing
//! and scoring can be exercised without a network.

mod chain;
mod heuristic;
mod raw;
mod structured;

pub use chain::ExtractionChain;
pub use heuristic::HeuristicParseExtractor;
pub use raw::RawMarkupExtractor;
pub use structured::StructuredMetadataExtractor;

use crate::candidate::{push_unique, ExtractionResult, ImageCandidate, SourceMethod};
use crate::fetcher::Fetcher;
use crate::filter::ImageFilter;
use crate::scoring::score_image;
use crate::utils::resolve_url;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub(crate) static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// A strategy that finds candidate images for an article.
#[async_trait]
pub trait ImageExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the article and return its candidates. Never fails; problems
    /// degrade to an empty result.
    async fn extract(&self, article_url: &Url) -> ExtractionResult;
}

/// Page download shared by the extractors.
#[derive(Clone)]
pub(crate) struct PageSource {
    fetcher: Fetcher,
    timeout: Duration,
}

impl PageSource {
    pub(crate) fn new(fetcher: Fetcher, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// The page HTML, or `None` after logging why it is unavailable.
    pub(crate) async fn load(&self, article_url: &Url, extractor: &str) -> Option<String> {
        match self.fetcher.fetch_text(article_url.as_str(), self.timeout).await {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(extractor, url = %article_url, error = %e, "page fetch failed");
                None
            }
        }
    }
}

/// First non-empty value among `attrs` on an element.
pub(crate) fn first_attr<'a>(element: &ElementRef<'a>, attrs: &[&str]) -> Option<&'a str> {
    attrs
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Resolve, filter and score one raw reference, appending it when new.
///
/// With an element the full filter applies; without one only the URL rules do.
pub(crate) fn collect(
    result: &mut ExtractionResult,
    filter: &ImageFilter,
    base: &Url,
    raw: &str,
    element: Option<&ElementRef>,
    source: SourceMethod,
    surrounding_text: Option<&str>,
) {
    let url = match resolve_url(base, raw) {
        Some(url) => url.to_string(),
        None => {
            debug!(raw, %source, "unresolvable image reference");
            return;
        }
    };

    if filter.exclude(&url, element) {
        debug!(url = %url, %source, "candidate excluded by filter");
        return;
    }

    let score = score_image(&url, element, source, surrounding_text);
    debug!(url = %url, score, %source, "candidate");
    push_unique(result, ImageCandidate::new(url, score, source));
}
