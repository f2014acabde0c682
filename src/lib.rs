//! # leadimage
//!
//! Finds the single most relevant illustrative image of a news article and
//! saves it as a normalized JPEG.
//!
//! ## Overview
//!
//! A page usually carries many images: the lead photo, inline pictures, site
//! logos, share buttons, ad creatives and invisible tracking pixels. leadimage
//! collects candidates from the page's metadata and markup, drops the obvious
//! chrome, scores the rest for relevance and keeps the best one that is
//! actually large enough to use.
//!
//! ## Key Features
//!
//! - **Fallback Extraction**: Structured metadata first, then a readability-style
//!   parse, then the raw markup, stopping as soon as a confident candidate exists
//! - **Filtering**: Logos, icons, tracking pixels, ad networks and tiny images
//!   never become candidates
//! - **Deterministic Scoring**: A pure function of URL, element context and provenance
//! - **Validation**: Size limits and decoded dimensions are checked before selection
//! - **Normalization**: Any supported format is re-encoded as an opaque JPEG
//! - **Batch Pipeline**: Bounded concurrency, per-article deadlines and graceful shutdown
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use leadimage::{ImagePipeline, ScraperOptions, SelectionOutcome};
//!
//! # async fn run() -> leadimage::Result<()> {
//! let pipeline = ImagePipeline::new(ScraperOptions::default())?;
//!
//! match pipeline.find_image("https://news.example.com/2024/05/flood").await? {
//!     SelectionOutcome::Selected(image) => {
//!         println!("{} (score {}, via {})", image.url, image.score, image.source);
//!     }
//!     other => println!("No image: {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Options
//!
//! ```rust
//! use leadimage::ScraperOptions;
//!
//! let options = ScraperOptions::builder()
//!     .min_acceptable_score(50)
//!     .concurrency(8)
//!     .jpeg_quality(85)
//!     .build();
//! assert_eq!(options.min_acceptable_score, 50);
//! ```
//!
//! ## Working Offline
//!
//! Every extractor can run on HTML you already have:
//!
//! ```rust
//! use leadimage::extractors::RawMarkupExtractor;
//! use leadimage::{Fetcher, ImageFilter, ScraperOptions, SourceMethod};
//! use std::sync::Arc;
//! use url::Url;
//!
//! let options = ScraperOptions::default();
//! let filter = Arc::new(ImageFilter::new(&options).unwrap());
//! let extractor = RawMarkupExtractor::new(Fetcher::new(&options).unwrap(), filter, &options);
//!
//! let html = r#"<html><head><meta property="og:image" content="/media/lead.jpg"></head></html>"#;
//! let base = Url::parse("https://news.example.com/story").unwrap();
//! let candidates = extractor.extract_from_html(html, &base);
//! assert_eq!(candidates[0].source, SourceMethod::OpenGraph);
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`Result`] with [`LeadImageError`]. Inside an
//! article most failures degrade instead of propagating: a failed page fetch
//! yields no candidates, a failed size probe accepts the image, and a failed
//! download leaves the record with `image: null`.

mod candidate;
mod constants;
mod content;
mod dom_utils;
mod error;
mod fetcher;
mod filter;
mod metadata;
mod normalizer;
mod options;
mod pipeline;
mod records;
mod scoring;
mod selection;
mod telemetry;
mod utils;
mod validator;

pub mod extractors;

// Public exports
pub use candidate::{ExtractionResult, ImageCandidate, SourceMethod};
pub use error::{LeadImageError, Result};
pub use extractors::{ExtractionChain, ImageExtractor};
pub use fetcher::{Fetcher, HeadInfo};
pub use filter::ImageFilter;
pub use metadata::{get_image_metadata, ImageMetadata};
pub use normalizer::{ImageNormalizer, NormalizedImage};
pub use options::{ScraperOptions, ScraperOptionsBuilder};
pub use pipeline::{ImagePipeline, RunStats};
pub use records::{
    list_input_records, sanitize_folder_name, ArticleRecord, ImageInfo, ARTICLE_DATA_FILE_NAME,
    IMAGE_FILE_NAME,
};
pub use scoring::score_image;
pub use selection::{ImageSelector, SelectionOutcome, SizeValidator};
pub use telemetry::init_tracing;
pub use validator::{probe_dimensions, ImageValidator};
