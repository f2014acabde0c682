use super::{collect, first_attr, ImageExtractor, PageSource, IMG_SELECTOR};
use crate::candidate::{ExtractionResult, SourceMethod};
use crate::fetcher::Fetcher;
use crate::filter::ImageFilter;
use crate::metadata::get_image_metadata;
use crate::options::ScraperOptions;
use crate::utils::first_srcset_url;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

static PICTURE_SOURCE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("picture source[srcset]").unwrap());

/// Last-resort strategy: every image reference in the raw markup.
pub struct RawMarkupExtractor {
    page: PageSource,
    filter: Arc<ImageFilter>,
}

impl RawMarkupExtractor {
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

        let declared = [
            (metadata.og_image.as_deref(), SourceMethod::OpenGraph),
            (metadata.twitter_image.as_deref(), SourceMethod::TwitterCard),
            (metadata.schema_image.as_deref(), SourceMethod::Schema),
        ];
        for (raw, source) in declared {
            if let Some(raw) = raw {
                collect(&mut result, &self.filter, base, raw, None, source, None);
            }
        }

        for img in document.select(&IMG_SELECTOR) {
            let src = match first_attr(&img, &["src", "data-src", "data-lazy-src"]) {
                Some(src) => src,
                None => continue,
            };
            // A title attribute stands in for a caption when the markup has none.
            let title = img.value().attr("title");
            collect(
                &mut result,
                &self.filter,
                base,
                src,
                Some(&img),
                SourceMethod::RawDom,
                title,
            );
        }

        for source in document.select(&PICTURE_SOURCE_SELECTOR) {
            let first = source.value().attr("srcset").and_then(first_srcset_url);
            if let Some(first) = first {
                collect(&mut result, &self.filter, base, first, None, SourceMethod::RawPicture, None);
            }
        }

        result
    }
}

#[async_trait]
impl ImageExtractor for RawMarkupExtractor {
    fn name(&self) -> &'static str {
        "raw"
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

    fn extractor() -> RawMarkupExtractor {
        let options = ScraperOptions::default();
        let filter = Arc::new(ImageFilter::new(&options).unwrap());
        RawMarkupExtractor::new(Fetcher::new(&options).unwrap(), filter, &options)
    }

    fn base() -> Url {
        Url::parse("https://site.com/2024/05/story").unwrap()
    }

    #[test]
    fn collects_every_reference_kind() {
        let html = r#"<html><head>
                <meta property="og:image" content="https://cdn.site.com/og-photo.jpg">
                <meta property="twitter:image" content="https://cdn.site.com/tw-photo.jpg">
                <script type="application/ld+json">{"@graph":[{"image":{"url":"https://cdn.site.com/ld-photo.jpg"}}]}</script>
            </head><body>
                <img src="/media/inline.jpg" alt="Protest march">
                <img data-lazy-src="/media/lazy.webp">
                <img src="/static/logo.png">
                <img src="/media/narrow.jpg" width="40">
                <picture>
                    <source srcset="/media/pic-800.webp 800w, /media/pic-400.webp 400w">
                    <img src="/media/og-dup.jpg">
                </picture>
                <img src="https://cdn.site.com/og-photo.jpg">
            </body></html>"#;

        let result = extractor().extract_from_html(html, &base());
        let found: Vec<_> = result.iter().map(|c| (c.url.as_str(), c.source)).collect();
        assert_eq!(
            found,
            vec![
                ("https://cdn.site.com/og-photo.jpg", SourceMethod::OpenGraph),
                ("https://cdn.site.com/tw-photo.jpg", SourceMethod::TwitterCard),
                ("https://cdn.site.com/ld-photo.jpg", SourceMethod::Schema),
                ("https://site.com/media/inline.jpg", SourceMethod::RawDom),
                ("https://site.com/media/lazy.webp", SourceMethod::RawDom),
                ("https://site.com/media/og-dup.jpg", SourceMethod::RawDom),
                ("https://site.com/media/pic-800.webp", SourceMethod::RawPicture),
            ]
        );
    }

    #[test]
    fn tracking_pixels_never_become_candidates() {
        let html = r#"<html><body>
            <img src="https://www.facebook.com/tr?id=123&ev=PageView" width="1" height="1">
            <img src="/assets/fb_pixel_tr.gif">
            <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
        </body></html>"#;
        assert!(extractor().extract_from_html(html, &base()).is_empty());
    }
}
