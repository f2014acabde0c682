//! Batch orchestration: records in, image folders out.
//!
//! For each article record the pipeline runs the extraction chain, selects
//! one candidate, normalizes it to `image.jpg` and writes the updated record
//! next to it. Articles are processed with bounded concurrency, each under
//! its own deadline; one article failing never stops the batch.
//!
//! ## Example
//!
//! ```rust,no_run
//! use leadimage::{ImagePipeline, ScraperOptions};
//! use std::path::Path;
//!
//! # async fn run() -> leadimage::Result<()> {
//! let pipeline = ImagePipeline::new(ScraperOptions::default())?;
//! let stats = pipeline.run(Path::new("articles"), Path::new("articles+images")).await?;
//! println!("{} of {} articles processed", stats.successful, stats.total);
//! # Ok(())
//! # }
//! ```

use crate::error::{LeadImageError, Result};
use crate::extractors::ExtractionChain;
use crate::fetcher::Fetcher;
use crate::filter::ImageFilter;
use crate::normalizer::ImageNormalizer;
use crate::options::ScraperOptions;
use crate::records::{list_input_records, ArticleRecord, FolderNames, ImageInfo, IMAGE_FILE_NAME};
use crate::selection::{ImageSelector, SelectionOutcome};
use crate::validator::ImageValidator;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fs;
use std::future::{self as std_future, Future};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

/// Counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Input records found.
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

pub struct ImagePipeline {
    options: ScraperOptions,
    chain: ExtractionChain,
    selector: ImageSelector,
    validator: ImageValidator,
    normalizer: ImageNormalizer,
}

impl ImagePipeline {
    /// Build every component from one set of options.
    pub fn new(options: ScraperOptions) -> Result<Self> {
        options.validate()?;

        let fetcher = Fetcher::new(&options)?;
        let filter = Arc::new(ImageFilter::new(&options)?);

        Ok(Self {
            chain: ExtractionChain::standard(fetcher.clone(), filter, &options),
            selector: ImageSelector::new(options.min_acceptable_score),
            validator: ImageValidator::new(fetcher.clone(), &options),
            normalizer: ImageNormalizer::new(fetcher, &options),
            options,
        })
    }

    /// Replace the extraction chain.
    pub fn with_chain(mut self, chain: ExtractionChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn options(&self) -> &ScraperOptions {
        &self.options
    }

    /// Run the extraction chain and selection for one article URL.
    pub async fn find_image(&self, article_url: &str) -> Result<SelectionOutcome> {
        let url = Url::parse(article_url)
            .map_err(|e| LeadImageError::InvalidUrl(format!("{}: {}", article_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LeadImageError::InvalidUrl(article_url.to_string()));
        }

        let candidates = self.chain.run(&url).await;
        Ok(self.selector.select(candidates, &self.validator).await)
    }

    /// Process one record file into its output folder.
    ///
    /// Returns the image written, if any. An article without a usable image
    /// still succeeds, with `image: null` in its record. Only a record that
    /// cannot be read or has no `url` is an error.
    pub async fn process_article(&self, path: &Path, output: &Path) -> Result<Option<ImageInfo>> {
        self.process_record(path, output, &FolderNames::default()).await
    }

    async fn process_record(
        &self,
        path: &Path,
        output: &Path,
        folders: &FolderNames,
    ) -> Result<Option<ImageInfo>> {
        let mut record = ArticleRecord::load(path)?;
        let url = record
            .url()
            .ok_or_else(|| {
                LeadImageError::Parse(format!("no url found in {}", path.display()))
            })?
            .to_string();
        let title = record.title().to_string();
        info!(title = %title, url = %url, "processing article");

        let folder_name = folders.claim(&title);
        let folder = output.join(&folder_name);
        fs::create_dir_all(&folder)?;

        // A malformed article URL degrades like any other fetch failure.
        let selected = self
            .find_image(&url)
            .await
            .and_then(SelectionOutcome::into_result);
        let image = match selected {
            Ok(candidate) => match self.normalizer.normalize(&candidate.url).await {
                Ok(normalized) => {
                    fs::write(folder.join(IMAGE_FILE_NAME), &normalized.bytes)?;
                    info!(
                        title = %title,
                        score = candidate.score,
                        width = normalized.width,
                        height = normalized.height,
                        "saved image"
                    );
                    Some(ImageInfo::new(&candidate, &folder_name))
                }
                Err(e) => {
                    error!(title = %title, url = %candidate.url, error = %e, "failed to download image");
                    None
                }
            },
            Err(e) => {
                warn!(title = %title, reason = %e, "no suitable image found");
                None
            }
        };

        record.finish(image.clone())?;
        record.write_to(&folder)?;
        Ok(image)
    }

    /// Process every record in `input` into `output`.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunStats> {
        self.run_with_shutdown(input, output, std_future::pending()).await
    }

    /// Like [`run`](Self::run), but stops scheduling articles once `shutdown`
    /// resolves and returns the counts so far. In-flight articles are dropped.
    pub async fn run_with_shutdown<F>(&self, input: &Path, output: &Path, shutdown: F) -> Result<RunStats>
    where
        F: Future<Output = ()>,
    {
        fs::create_dir_all(output)?;
        let paths = list_input_records(input)?;

        let mut stats = RunStats {
            total: paths.len(),
            ..RunStats::default()
        };
        if paths.is_empty() {
            warn!(input = %input.display(), "no JSON files found");
            return Ok(stats);
        }
        info!(total = stats.total, concurrency = self.options.concurrency, "starting batch");

        let deadline = self.options.article_deadline();
        let folders = FolderNames::default();
        let folders = &folders;
        let mut results = stream::iter(paths)
            .map(|path| async move {
                let outcome =
                    tokio::time::timeout(deadline, self.process_record(&path, output, folders)).await;
                (path, outcome)
            })
            .buffer_unordered(self.options.concurrency.max(1));

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!(
                        successful = stats.successful,
                        failed = stats.failed,
                        "shutdown requested; stopping batch"
                    );
                    break;
                }
                next = results.next() => match next {
                    Some((_, Ok(Ok(_)))) => stats.successful += 1,
                    Some((path, Ok(Err(e)))) => {
                        error!(path = %path.display(), error = %e, "failed to process article");
                        stats.failed += 1;
                    }
                    Some((path, Err(_))) => {
                        error!(
                            path = %path.display(),
                            deadline_secs = deadline.as_secs(),
                            "article deadline elapsed"
                        );
                        stats.failed += 1;
                    }
                    None => break,
                },
            }
        }

        info!(
            total = stats.total,
            successful = stats.successful,
            failed = stats.failed,
            "batch finished"
        );
        Ok(stats)
    }
}
