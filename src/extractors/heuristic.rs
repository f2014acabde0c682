use super::{collect, first_attr, ImageExtractor, PageSource, IMG_SELECTOR};
use crate::candidate::{ExtractionResult, SourceMethod};
use crate::content::top_candidate;
use crate::fetcher::Fetcher;
use crate::filter::ImageFilter;
use crate::metadata::get_image_metadata;
use crate::options::ScraperOptions;
use crate::utils::parse_dimension;
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use url::Url;

/// Full-document readability pass: finds the content block and takes its
/// images, with the page's top image first.
pub struct HeuristicParseExtractor {
    page: PageSource,
    filter: Arc<ImageFilter>,
}

impl HeuristicParseExtractor {
    pub fn new(fetcher: Fetcher, filter: Arc<ImageFilter>, options: &ScraperOptions) -> Self {
        Self {
            page: PageSource::new(fetcher, options.request_timeout()),
            filter,
        }
    }

    pub fn extract_from_html(&self, html: &str, base: &Url) -> ExtractionResult {
        let document = Html::parse_document(html);
        let mut result = ExtractionResult::new();

        let top = top_candidate(&document);
        let scope = top.unwrap_or_else(|| document.root_element());

        let metadata = get_image_metadata(&document);
        match metadata.top_image() {
            Some(raw) => collect(&mut result, &self.filter, base, raw, None, SourceMethod::ParsedTop, None),
            None => {
                if let Some(img) = top.and_then(|top| largest_image(&top)) {
                    if let Some(src) = first_attr(&img, &["src", "data-src"]) {
                        collect(
                            &mut result,
                            &self.filter,
                            base,
                            src,
                            Some(&img),
                            SourceMethod::ParsedTop,
                            None,
                        );
                    }
                }
            }
        }

        for img in scope.select(&IMG_SELECTOR) {
            if let Some(src) = first_attr(&img, &["src", "data-src"]) {
                collect(
                    &mut result,
                    &self.filter,
                    base,
                    src,
                    Some(&img),
                    SourceMethod::ParsedInline,
                    None,
                );
            }
        }

        result
    }
}

/// The image with the largest declared `width * height`; the first one wins ties.
fn largest_image<'a>(container: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut best: Option<(ElementRef<'a>, u64)> = None;
    for img in container.select(&IMG_SELECTOR) {
        let dimension = |name| img.value().attr(name).and_then(parse_dimension).unwrap_or(0);
        let area = u64::from(dimension("width")) * u64::from(dimension("height"));
        if best.as_ref().map_or(true, |(_, best_area)| area > *best_area) {
            best = Some((img, area));
        }
    }
    best.map(|(img, _)| img)
}

#[async_trait]
impl ImageExtractor for HeuristicParseExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn extract(&self, article_url: &Url) -> ExtractionResult {
        match self.page.load(article_url, self.name()).await {
            Some(html) => self.extract_from_html(&html, article_url),
            None => ExtractionResult::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAGRAPH: &str = "The council voted on Monday, after a long debate, to rebuild the \
        bridge, which was damaged in the storm, at a cost of four million pounds.";

    fn extractor() -> HeuristicParseExtractor {
        let options = ScraperOptions::default();
        let filter = Arc::new(ImageFilter::new(&options).unwrap());
        HeuristicParseExtractor::new(Fetcher::new(&options).unwrap(), filter, &options)
    }

    fn base() -> Url {
        Url::parse("https://local.example.com/news/bridge").unwrap()
    }

    #[test]
    fn largest_declared_image_is_top_without_metadata() {
        let html = format!(
            r#"<html><body>
                <div class="sidebar"><img src="/media/promo-photo.jpg" width="300" height="250"></div>
                <div class="story">
                    <img src="/media/bridge-small.jpg" width="320" height="200">
                    <p>{PARAGRAPH}</p><p>{PARAGRAPH}</p>
                    <img src="/media/bridge-wide.jpg" width="1280" height="720">
                </div>
            </body></html>"#
        );

        let result = extractor().extract_from_html(&html, &base());
        let found: Vec<_> = result.iter().map(|c| (c.url.as_str(), c.source)).collect();
        assert_eq!(
            found,
            vec![
                ("https://local.example.com/media/bridge-wide.jpg", SourceMethod::ParsedTop),
                ("https://local.example.com/media/bridge-small.jpg", SourceMethod::ParsedInline),
            ]
        );
    }

    #[test]
    fn image_src_link_takes_precedence() {
        let html = format!(
            r#"<html><head>
                <link rel="image_src" href="https://cdn.example.com/bridge-lead.jpg">
                <meta property="og:image" content="https://cdn.example.com/bridge-og.jpg">
            </head><body>
                <div class="story"><p>{PARAGRAPH}</p><img src="/media/inline.jpg"></div>
            </body></html>"#
        );

        let result = extractor().extract_from_html(&html, &base());
        assert_eq!(result[0].url, "https://cdn.example.com/bridge-lead.jpg");
        assert_eq!(result[0].source, SourceMethod::ParsedTop);
        assert_eq!(result[1].url, "https://local.example.com/media/inline.jpg");
        assert_eq!(result[1].source, SourceMethod::ParsedInline);
    }

    #[test]
    fn whole_document_scanned_without_top_candidate() {
        let html = r#"<html><body><img src="/media/only-photo.jpg"></body></html>"#;
        let result = extractor().extract_from_html(html, &base());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, SourceMethod::ParsedInline);
    }
}
