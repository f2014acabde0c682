use super::{collect, first_attr, ImageExtractor, PageSource, IMG_SELECTOR};
use crate::candidate::{ExtractionResult, SourceMethod};
use crate::content::find_body_container;
use crate::fetcher::Fetcher;
use crate::filter::ImageFilter;
use crate::metadata::get_image_metadata;
use crate::options::ScraperOptions;
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use url::Url;

/// Cheapest strategy: the page's declared main image plus the images of its
/// readable body.
pub struct StructuredMetadataExtractor {
    page: PageSource,
    filter: Arc<ImageFilter>,
}

impl StructuredMetadataExtractor {
    pub fn new(fetcher: Fetcher, filter: Arc<ImageFilter>, options: &ScraperOptions) -> Self {
        Self {
            page: PageSource::new(fetcher, options.request_timeout()),
            filter,
        }
    }

    pub fn extract_from_html(&self, html: &str, base: &Url) -> ExtractionResult {
        let document = Html::parse_document(html);
        let mut result = ExtractionResult::new();

        let metadata = get_image_metadata(&document);
        if let Some(main) = metadata.main_image() {
            collect(&mut result, &self.filter, base, main, None, SourceMethod::StructuredMain, None);
        }

        if let Some(body) = find_body_container(&document) {
            for img in body.select(&IMG_SELECTOR) {
                if let Some(src) = first_attr(&img, &["src", "data-src"]) {
                    collect(
                        &mut result,
                        &self.filter,
                        base,
                        src,
                        Some(&img),
                        SourceMethod::StructuredInline,
                        None,
                    );
                }
            }
        }

        result
    }
}

#[async_trait]
impl ImageExtractor for StructuredMetadataExtractor {
    fn name(&self) -> &'static str {
        "structured"
    }

    async fn extract(&self, article_url: &Url) -> ExtractionResult {
        match self.page.load(article_url, self.name()).await {
            Some(html) => self.extract_from_html(&html, article_url),
            None => ExtractionResult::new(),
        }
    }
}
