//! Cost-ordered fallback over the extraction strategies.

use super::{
    HeuristicParseExtractor, ImageExtractor, RawMarkupExtractor, StructuredMetadataExtractor,
};
use crate::candidate::ExtractionResult;
use crate::fetcher::Fetcher;
use crate::filter::ImageFilter;
use crate::options::ScraperOptions;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

struct Stage {
    extractor: Box<dyn ImageExtractor>,
    /// Run only while the best score so far is below this; `None` always runs.
    run_below: Option<u8>,
}

/// Runs extractors in order, skipping the later, more expensive ones once an
/// earlier one has produced a good enough candidate.
///
/// All candidates from every stage that ran are returned, in stage order.
#[derive(Default)]
pub struct ExtractionChain {
    stages: Vec<Stage>,
}

impl ExtractionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn stage(mut self, extractor: impl ImageExtractor + 'static, run_below: Option<u8>) -> Self {
        self.stages.push(Stage {
            extractor: Box::new(extractor),
            run_below,
        });
        self
    }

    /// Structured metadata always, then the heuristic parse below
    /// `structured_threshold`, then the raw markup below `parse_threshold`.
    pub fn standard(fetcher: Fetcher, filter: Arc<ImageFilter>, options: &ScraperOptions) -> Self {
        Self::new()
            .stage(
                StructuredMetadataExtractor::new(fetcher.clone(), filter.clone(), options),
                None,
            )
            .stage(
                HeuristicParseExtractor::new(fetcher.clone(), filter.clone(), options),
                Some(options.structured_threshold),
            )
            .stage(
                RawMarkupExtractor::new(fetcher, filter, options),
                Some(options.parse_threshold),
            )
    }

    pub async fn run(&self, article_url: &Url) -> ExtractionResult {
        let mut candidates = ExtractionResult::new();
        let mut best: Option<u8> = None;

        for stage in &self.stages {
            let name = stage.extractor.name();
            if let (Some(limit), Some(best)) = (stage.run_below, best) {
                if best >= limit {
                    debug!(extractor = name, best, limit, "skipping extractor");
                    continue;
                }
            }

            let found = stage.extractor.extract(article_url).await;
            let stage_best = found.iter().map(|c| c.score).max();
            info!(
                extractor = name,
                url = %article_url,
                found = found.len(),
                best = stage_best.unwrap_or(0),
                "extractor finished"
            );

            best = best.max(stage_best);
            candidates.extend(found);
        }

        candidates
    }
}
