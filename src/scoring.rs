//! Relevance scoring for candidate images.
//!
//! [`score_image`] maps a candidate URL, the element it came from (when the
//! extractor had one), its provenance and optional surrounding text to a score in
//! `0..=100`. Signals are summed from a base of 50 and the total is clamped, so
//! no combination of inputs can leave the range. The function is pure: the same
//! inputs always give the same score.
//!
//! ## Example
//!
//! ```rust
//! use leadimage::{score_image, SourceMethod};
//!
//! let og = score_image("https://cdn.example.com/2024/hero.jpg", None, SourceMethod::OpenGraph, None);
//! let logo = score_image("https://example.com/logo.png", None, SourceMethod::RawDom, None);
//! assert!(og > logo);
//! ```

use crate::candidate::SourceMethod;
use crate::constants::{self, REGEXPS};
use crate::dom_utils;
use crate::utils::{contains_any, contains_any_token, strip_query};
use scraper::ElementRef;

const BASE_SCORE: i32 = 50;

/// Score a candidate image.
///
/// * `url` - absolute candidate URL
/// * `element` - the `<img>` element, when the extractor has one
/// * `source` - the strategy that found the candidate
/// * `surrounding_text` - caption-like text supplied by the extractor; only
///   consulted for the caption signal when the DOM has no caption of its own
pub fn score_image(
    url: &str,
    element: Option<&ElementRef>,
    source: SourceMethod,
    surrounding_text: Option<&str>,
) -> u8 {
    let url_lower = url.to_lowercase();

    let mut score = BASE_SCORE + source.prior();
    score += url_signals(&url_lower);

    if let Some(element) = element {
        score += element_signals(element);
        score += context_signal(element, surrounding_text);
    }

    score += extension_signal(&url_lower);

    score.clamp(0, 100) as u8
}

fn url_signals(url_lower: &str) -> i32 {
    let mut score = 0;

    if contains_any(url_lower, constants::HERO_TERMS) {
        score += 20;
    }
    if contains_any(url_lower, constants::SIZE_TERMS) {
        score += 12;
    }
    if url_lower.contains("wp-content/uploads") {
        score += 10;
    }
    if contains_any(url_lower, constants::CONTENT_TERMS) {
        score += 8;
    }

    if contains_any(url_lower, constants::LOGO_TERMS) {
        score -= 25;
    }
    if contains_any(url_lower, constants::SITE_BRAND_TERMS)
        || contains_any_token(url_lower, constants::SITE_BRAND_TOKENS)
    {
        score -= 15;
    }
    if REGEXPS.facebook_pixel.is_match(url_lower) {
        score -= 50;
    }
    if contains_any(url_lower, constants::TRACKING_TERMS) {
        score -= 40;
    }
    if contains_any(url_lower, constants::SMALL_TERMS) {
        score -= 15;
    }
    if contains_any(url_lower, constants::AD_TERMS)
        || contains_any_token(url_lower, constants::AD_TOKENS)
    {
        score -= 20;
    }
    if contains_any(url_lower, constants::SOCIAL_TERMS) {
        score -= 10;
    }

    // Common logo sizes, in either axis.
    if contains_any(url_lower, constants::LOGO_WIDTHS) {
        score -= 12;
    }
    if contains_any(url_lower, constants::LOGO_HEIGHTS) {
        score -= 12;
    }

    score
}

fn element_signals(element: &ElementRef) -> i32 {
    let mut score = 0;

    let alt = dom_utils::alt_text(element);
    if !alt.is_empty() {
        if contains_any(&alt, constants::ALT_POSITIVE_TERMS) {
            score += 10;
        }
        if contains_any(&alt, constants::ALT_NEGATIVE_TERMS) {
            score -= 15;
        }
    }

    let classes = dom_utils::class_string(element);
    if contains_any(&classes, constants::CLASS_POSITIVE_TERMS) {
        score += 15;
    }
    if contains_any(&classes, constants::AD_TERMS)
        || contains_any_token(&classes, constants::AD_TOKENS)
    {
        score -= 20;
    }

    if let Some(parent) = dom_utils::parent_element(element) {
        let parent_classes = dom_utils::class_string(&parent);
        if contains_any(&parent_classes, constants::PARENT_POSITIVE_TERMS) {
            score += 10;
        }
        if contains_any(&parent_classes, constants::PARENT_NEGATIVE_TERMS) {
            score -= 15;
        }
    }

    score
}

/// Ancestor and caption context, floored at zero.
fn context_signal(element: &ElementRef, surrounding_text: Option<&str>) -> i32 {
    let mut score = 0;

    for ancestor in element.ancestors().filter_map(ElementRef::wrap).take(3) {
        let marker = format!(
            "{}{}",
            dom_utils::class_string(&ancestor),
            dom_utils::id_string(&ancestor)
        );
        if contains_any(&marker, constants::CONTEXT_POSITIVE_TERMS) {
            score += 15;
            break;
        }
        if contains_any(&marker, constants::CONTEXT_NEGATIVE_TERMS)
            || contains_any_token(&marker, constants::AD_TOKENS)
        {
            score -= 10;
            break;
        }
    }

    let caption_len = dom_utils::caption_length(element).or_else(|| {
        surrounding_text.map(|text| text.trim().chars().count())
    });
    if caption_len.map_or(false, |len| len > 10) {
        score += 10;
    }

    score.max(0)
}

fn extension_signal(url_lower: &str) -> i32 {
    let path = strip_query(url_lower);
    if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        5
    } else if path.ends_with(".png") {
        2
    } else if path.ends_with(".gif") {
        -5
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn img<'a>(document: &'a Html, id: &str) -> ElementRef<'a> {
        let selector = Selector::parse(&format!("#{}", id)).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn structured_main_plain_url() {
        // 50 base + 30 prior + 5 jpg
        let score = score_image(
            "https://example.com/2024/05/flood.jpg",
            None,
            SourceMethod::StructuredMain,
            None,
        );
        assert_eq!(score, 85);
    }

    #[test]
    fn opengraph_bonus_applied_once() {
        // 50 + 25 (opengraph) + 20 (hero) - 12 ("200x" in 1200x800) + 5 (jpg)
        let score = score_image(
            "https://cdn.example.com/uploads/hero-1200x800.jpg",
            None,
            SourceMethod::OpenGraph,
            None,
        );
        assert_eq!(score, 88);
        let twitter = score_image(
            "https://example.com/2024/flood.png",
            None,
            SourceMethod::TwitterCard,
            None,
        );
        // 50 + 20 + 2
        assert_eq!(twitter, 72);
    }

    #[test]
    fn logo_candidate_scores_low() {
        let html = r#"<div class="site-nav"><img id="l" src="/logo.png" alt="Site logo"></div>"#;
        let document = Html::parse_fragment(html);
        let score = score_image(
            "https://example.com/logo.png",
            Some(&img(&document, "l")),
            SourceMethod::RawDom,
            None,
        );
        // 50 + 5 - 25 (logo) - 15 (alt logo) + 2 (png); context: nav -10 floored to 0
        assert_eq!(score, 17);
    }

    #[test]
    fn facebook_pixel_clamps_to_zero() {
        let score = score_image(
            "https://site.com/assets/fb_pixel_tr.gif",
            None,
            SourceMethod::RawDom,
            None,
        );
        assert_eq!(score, 0);
    }

    #[test]
    fn adversarial_inputs_stay_in_range() {
        let worst = "https://www.facebook.com/tr?analytics&tracking&pixel?&beacon?/logo-brand-ad-banner-thumb-social-150x150x50-company.gif";
        assert_eq!(score_image(worst, None, SourceMethod::RawPicture, None), 0);

        let html = r#"
            <div class="article-content">
              <figure class="main">
                <img id="best" class="featured hero main" alt="Main story photo" src="x.jpg">
                <figcaption>Rescue teams reach the flooded district at dawn</figcaption>
              </figure>
            </div>"#;
        let document = Html::parse_fragment(html);
        let best = "https://cdn.example.com/wp-content/uploads/featured-hero-large-photo.jpeg";
        assert_eq!(
            score_image(best, Some(&img(&document, "best")), SourceMethod::StructuredMain, None),
            100
        );
    }

    #[test]
    fn context_signals_from_ancestors_and_caption() {
        let html = r#"
            <div class="story-body">
              <figure>
                <img id="a" src="a.jpg">
                <figcaption>Crowds gather outside the court building</figcaption>
              </figure>
            </div>
            <div class="sidebar"><span><img id="b" src="b.jpg"></span></div>"#;
        let document = Html::parse_fragment(html);
        let url = "https://example.com/2024/a.webp";

        // figure (no match) -> div.story-body (+15), caption +10
        let a = score_image(url, Some(&img(&document, "a")), SourceMethod::ParsedInline, None);
        assert_eq!(a, 50 + 10 + 15 + 10);

        // span (no match) -> div.sidebar (-10), floored to 0; no caption
        let b = score_image(url, Some(&img(&document, "b")), SourceMethod::ParsedInline, None);
        assert_eq!(b, 60);
    }

    #[test]
    fn surrounding_text_counts_as_caption_when_dom_has_none() {
        let html = r#"<p><img id="a" src="a.jpg"></p>"#;
        let document = Html::parse_fragment(html);
        let url = "https://example.com/2024/a.webp";
        let without = score_image(url, Some(&img(&document, "a")), SourceMethod::RawDom, None);
        let with = score_image(
            url,
            Some(&img(&document, "a")),
            SourceMethod::RawDom,
            Some("Firefighters battle the blaze overnight"),
        );
        assert_eq!(with, without + 10);
    }

    #[test]
    fn extension_ignores_query_string() {
        let jpg = score_image("https://e.com/2024/a.jpg?w=800", None, SourceMethod::RawDom, None);
        let gif = score_image("https://e.com/2024/a.gif", None, SourceMethod::RawDom, None);
        assert_eq!(jpg, 60);
        assert_eq!(gif, 50);
    }

    #[test]
    fn scoring_is_deterministic() {
        let html = r#"<div class="content"><img id="a" class="hero" alt="news photo" src="a.jpg"></div>"#;
        let document = Html::parse_fragment(html);
        let element = img(&document, "a");
        let url = "https://example.com/media/lead.jpg";
        let first = score_image(url, Some(&element), SourceMethod::RawDom, Some("caption text here"));
        for _ in 0..10 {
            assert_eq!(
                score_image(url, Some(&element), SourceMethod::RawDom, Some("caption text here")),
                first
            );
        }
    }
}
