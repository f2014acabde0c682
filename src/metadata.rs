//! Image metadata extraction from HTML documents (JSON-LD, meta tags, links).

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;

static META_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());
static JSON_LD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type='application/ld+json']").unwrap());
static IMAGE_SRC_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link[rel~='image_src']").unwrap());
static ITEMPROP_IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[itemprop='image'], link[itemprop='image']").unwrap());

/// Image references declared by the document, unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    /// `og:image`, falling back to `og:image:url` and `og:image:secure_url`
    pub og_image: Option<String>,
    /// `twitter:image`, falling back to `twitter:image:src`
    pub twitter_image: Option<String>,
    /// First `image` found in a JSON-LD block
    pub schema_image: Option<String>,
    /// `<link rel="image_src">`
    pub link_image_src: Option<String>,
    /// `itemprop="image"` on a meta or link element
    pub itemprop_image: Option<String>,
}

impl ImageMetadata {
    /// The page's declared main image, as a metadata reader sees it.
    pub fn main_image(&self) -> Option<&str> {
        self.og_image
            .as_deref()
            .or(self.twitter_image.as_deref())
            .or(self.schema_image.as_deref())
            .or(self.link_image_src.as_deref())
    }

    /// The top image as a full-document parser picks it from metadata.
    pub fn top_image(&self) -> Option<&str> {
        self.link_image_src
            .as_deref()
            .or(self.og_image.as_deref())
            .or(self.itemprop_image.as_deref())
            .or(self.twitter_image.as_deref())
    }
}

/// Extract every declared image reference from a document.
///
/// Supports OpenGraph, Twitter Cards, JSON-LD, `image_src` links and microdata.
pub fn get_image_metadata(document: &Html) -> ImageMetadata {
    let mut values: HashMap<String, String> = HashMap::new();

    for meta in document.select(&META_SELECTOR) {
        let content = match meta.value().attr("content") {
            Some(content) if !content.trim().is_empty() => content.trim(),
            _ => continue,
        };

        // property and name may both carry space-separated keys
        let keys = meta
            .value()
            .attr("property")
            .into_iter()
            .chain(meta.value().attr("name"))
            .flat_map(str::split_whitespace);

        for key in keys {
            let key = key.to_lowercase();
            if key.starts_with("og:image") || key.starts_with("twitter:image") {
                values.entry(key).or_insert_with(|| content.to_string());
            }
        }
    }

    let og_image = ["og:image", "og:image:url", "og:image:secure_url"]
        .iter()
        .find_map(|key| values.get(*key).cloned());
    let twitter_image = ["twitter:image", "twitter:image:src"]
        .iter()
        .find_map(|key| values.get(*key).cloned());

    let link_image_src = document
        .select(&IMAGE_SRC_LINK_SELECTOR)
        .find_map(|link| non_empty(link.value().attr("href")));

    let itemprop_image = document.select(&ITEMPROP_IMAGE_SELECTOR).find_map(|el| {
        non_empty(el.value().attr("content")).or_else(|| non_empty(el.value().attr("href")))
    });

    ImageMetadata {
        og_image,
        twitter_image,
        schema_image: get_json_ld_image(document),
        link_image_src,
        itemprop_image,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extract the first `image` field from `<script type="application/ld+json">` blocks.
///
/// Handles a top-level object, a top-level array of objects, and `@graph`
/// arrays. Malformed blocks are skipped.
pub fn get_json_ld_image(document: &Html) -> Option<String> {
    for script in document.select(&JSON_LD_SELECTOR) {
        let content = script.text().collect::<String>();

        // Strip CDATA markers if present
        let content = content
            .trim()
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();

        let parsed = match serde_json::from_str::<Value>(content) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };

        let found = match &parsed {
            Value::Array(items) => items.iter().find_map(image_of_node),
            Value::Object(_) => image_of_node(&parsed).or_else(|| {
                parsed
                    .get("@graph")
                    .and_then(Value::as_array)
                    .and_then(|graph| graph.iter().find_map(image_of_node))
            }),
            _ => None,
        };

        if found.is_some() {
            return found;
        }
    }

    None
}

/// The image URL of a single JSON-LD node.
fn image_of_node(node: &Value) -> Option<String> {
    image_value_url(node.get("image")?)
}

/// An `image` value may be a URL, a list of them, or an ImageObject.
fn image_value_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) => non_empty(Some(url)),
        Value::Array(items) => items.first().and_then(image_value_url),
        Value::Object(object) => object
            .get("url")
            .or_else(|| object.get("@id"))
            .and_then(Value::as_str)
            .and_then(|url| non_empty(Some(url))),
        _ => None,
    }
}
