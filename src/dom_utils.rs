//! DOM helpers over `scraper` element references.

use scraper::{ElementRef, Selector};
use once_cell::sync::Lazy;

static CAPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("figcaption, caption, div").unwrap());

/// Lowercased `class` attribute of an element.
pub fn class_string(element: &ElementRef) -> String {
    element.value().attr("class").unwrap_or("").to_lowercase()
}

/// Lowercased `id` attribute of an element.
pub fn id_string(element: &ElementRef) -> String {
    element.value().attr("id").unwrap_or("").to_lowercase()
}

/// Lowercased `alt` attribute of an element.
pub fn alt_text(element: &ElementRef) -> String {
    element.value().attr("alt").unwrap_or("").to_lowercase()
}

pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Nearest ancestor whose tag is one of `names`.
pub fn find_ancestor<'a>(element: &ElementRef<'a>, names: &[&str]) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| names.contains(&ancestor.value().name()))
}

/// Character count of an element's trimmed text.
pub fn text_length(element: &ElementRef) -> usize {
    element.text().collect::<String>().trim().chars().count()
}

/// Share of an element's text that sits inside links.
pub fn get_link_density(element: ElementRef) -> f64 {
    let total_length = text_length(&element);
    if total_length == 0 {
        return 0.0;
    }

    let link_selector = match Selector::parse("a") {
        Ok(selector) => selector,
        Err(_) => return 0.0,
    };

    let link_length: f64 = element
        .select(&link_selector)
        .map(|link| {
            let coefficient = match link.value().attr("href") {
                Some(href) if href.starts_with('#') => 0.3,
                _ => 1.0,
            };
            text_length(&link) as f64 * coefficient
        })
        .sum();

    link_length / total_length as f64
}

/// Length of the caption text attached to an image, if any.
///
/// Looks for the nearest `figure` or `div` ancestor and takes the first
/// `figcaption`, `caption` or `div` inside it.
pub fn caption_length(element: &ElementRef) -> Option<usize> {
    let container = find_ancestor(element, &["figure", "div"])?;
    let caption = container.select(&CAPTION_SELECTOR).next()?;
    Some(text_length(&caption))
}
