//! Locating the article content inside a page.
//!
//! Two strategies are provided. [`find_body_container`] is the cheap one: it
//! tries a fixed list of selectors that news sites commonly use for the article
//! body. [`top_candidate`] is a readability-style scoring pass over the whole
//! document, used when nothing cheaper gave a confident answer.

use crate::constants::{ARTICLE_BODY_SELECTORS, MIN_BODY_TEXT_LEN, REGEXPS};
use crate::dom_utils;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

static BODY_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ARTICLE_BODY_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p, pre, td").unwrap());

/// Paragraphs shorter than this are not scored.
const MIN_PARAGRAPH_LEN: usize = 25;

/// First element matching the article-body selectors with enough text to be
/// the readable body.
pub fn find_body_container(document: &Html) -> Option<ElementRef<'_>> {
    BODY_SELECTORS.iter().find_map(|selector| {
        document
            .select(selector)
            .find(|el| dom_utils::text_length(el) >= MIN_BODY_TEXT_LEN)
    })
}

/// Class and id weight of an element.
pub fn get_class_weight(element: &ElementRef) -> f64 {
    let mut weight = 0.0;

    for value in [element.value().attr("class"), element.value().attr("id")]
        .into_iter()
        .flatten()
    {
        if value.is_empty() {
            continue;
        }
        if REGEXPS.negative.is_match(value) {
            weight -= 25.0;
        }
        if REGEXPS.positive.is_match(value) {
            weight += 25.0;
        }
    }

    weight
}

fn tag_weight(element: &ElementRef) -> f64 {
    match element.value().name() {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

/// Whether an element looks like page chrome rather than content.
fn is_unlikely_candidate(element: &ElementRef) -> bool {
    let name = element.value().name();
    if name == "body" || name == "html" || name == "a" {
        return false;
    }
    let match_string = format!(
        "{} {}",
        element.value().attr("class").unwrap_or(""),
        element.value().attr("id").unwrap_or("")
    );
    if match_string.trim().is_empty() {
        return false;
    }
    REGEXPS.unlikely_candidates.is_match(&match_string)
        && !REGEXPS.ok_maybe_its_a_candidate.is_match(&match_string)
}

/// Whether the paragraph sits in (or is) an element that looks like chrome.
fn in_unlikely_subtree(element: &ElementRef) -> bool {
    is_unlikely_candidate(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_unlikely_candidate(&ancestor))
}

/// The element the readability scoring pass rates highest, if any scored.
///
/// Every `p`, `pre` and `td` with enough text contributes its content score
/// to its parent in full and to its grandparent by half. Each container starts
/// from its tag and class weight, and the final score is scaled by the share
/// of text that is not link text.
pub fn top_candidate(document: &Html) -> Option<ElementRef<'_>> {
    let mut scores = HashMap::new();
    // Containers in the order they were first scored; breaks ties.
    let mut order = Vec::new();

    for paragraph in document.select(&PARAGRAPH_SELECTOR) {
        if in_unlikely_subtree(&paragraph) {
            continue;
        }

        let text = paragraph.text().collect::<String>();
        let text = text.trim();
        let text_len = text.chars().count();
        if text_len < MIN_PARAGRAPH_LEN {
            continue;
        }

        // One point for the paragraph, one per comma, one per 100 chars up to 3.
        let commas = text.matches(|c: char| c == ',' || c == '，').count();
        let content_score = 1.0 + (commas + 1) as f64 + ((text_len / 100).min(3)) as f64;

        let ancestors = paragraph
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take(2)
            .enumerate();
        for (level, ancestor) in ancestors {
            let divider = if level == 0 { 1.0 } else { 2.0 };
            let entry = scores.entry(ancestor.id()).or_insert_with(|| {
                order.push(ancestor.id());
                tag_weight(&ancestor) + get_class_weight(&ancestor)
            });
            *entry += content_score / divider;
        }
    }

    let mut best: Option<(ElementRef<'_>, f64)> = None;
    for id in order {
        let element = match document.tree.get(id).and_then(ElementRef::wrap) {
            Some(element) => element,
            None => continue,
        };
        let score = scores.get(&id).copied().unwrap_or_default();
        let scaled = score * (1.0 - dom_utils::get_link_density(element));
        // Strictly greater, so ties keep the element scored first.
        let better = match &best {
            None => true,
            Some((_, current_score)) => scaled > *current_score,
        };
        if better {
            best = Some((element, scaled));
        }
    }

    best.map(|(element, _)| element)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "The river rose three metres overnight, forcing hundreds of families, \
        many of them farmers, to leave their homes before dawn, officials said on Tuesday.";

    #[test]
    fn body_container_requires_text() {
        let html = format!(
            r#"<html><body>
                <article id="short">Too short.</article>
                <div class="article-body" id="real"><p>{LONG}</p><p>{LONG}</p></div>
            </body></html>"#
        );
        let document = Html::parse_document(&html);
        let body = find_body_container(&document).unwrap();
        assert_eq!(body.value().attr("id"), Some("real"));
    }

    #[test]
    fn no_body_container_on_thin_page() {
        let document = Html::parse_document("<html><body><main>Hi</main></body></html>");
        assert!(find_body_container(&document).is_none());
    }

    #[test]
    fn top_candidate_prefers_content_over_chrome() {
        let html = format!(
            r#"<html><body>
                <div class="sidebar"><p>{LONG}</p><p>{LONG}</p><p>{LONG}</p></div>
                <div id="story" class="story-text"><p>{LONG}</p><p>{LONG}</p></div>
                <div class="links"><p><a href="/x">{LONG}</a></p></div>
            </body></html>"#
        );
        let document = Html::parse_document(&html);
        let top = top_candidate(&document).unwrap();
        assert_eq!(top.value().attr("id"), Some("story"));
    }

    #[test]
    fn top_candidate_ties_go_to_the_first_container() {
        let html = format!(
            r#"<html><body>
                <section id="first"><p>{LONG}</p></section>
                <section id="second"><p>{LONG}</p></section>
            </body></html>"#
        );
        let document = Html::parse_document(&html);
        let top = top_candidate(&document).unwrap();
        assert_eq!(top.value().attr("id"), Some("first"));
    }

    #[test]
    fn no_top_candidate_without_paragraphs() {
        let document = Html::parse_document("<html><body><img src='a.jpg'></body></html>");
        assert!(top_candidate(&document).is_none());
    }

    #[test]
    fn class_weight_signs() {
        let document = Html::parse_fragment(
            r#"<div id="a" class="article-content"></div><div id="b" class="comment"></div>"#,
        );
        let pick = |id: &str| {
            let selector = Selector::parse(&format!("#{}", id)).unwrap();
            document.select(&selector).next().unwrap()
        };
        assert_eq!(get_class_weight(&pick("a")), 25.0);
        assert_eq!(get_class_weight(&pick("b")), -25.0);
    }
}
