//! Exclusion predicate for candidate image URLs and elements.
//!
//! [`ImageFilter`] decides whether a URL (and optionally the `<img>` element it
//! came from) is chrome, tracking or advertising rather than article imagery.
//! Every rule is a plain check against tables taken from
//! [`ScraperOptions`](crate::ScraperOptions); the filter holds no mutable state
//! and is shared by all extractors.
//!
//! ## Example
//!
//! ```rust
//! use leadimage::{ImageFilter, ScraperOptions};
//!
//! let filter = ImageFilter::new(&ScraperOptions::default()).unwrap();
//! assert!(filter.exclude_url("https://ads.googlesyndication.com/x.png"));
//! assert!(!filter.exclude_url("https://cdn.example.com/uploads/hero-1200x800.jpg"));
//! ```

use crate::constants::REGEXPS;
use crate::dom_utils;
use crate::error::{LeadImageError, Result};
use crate::options::ScraperOptions;
use crate::utils;
use regex::{Regex, RegexBuilder};
use scraper::ElementRef;
use url::Url;

/// Decides which candidate images are excluded before scoring.
#[derive(Debug, Clone)]
pub struct ImageFilter {
    lexical: Regex,
    tracking_domains: Vec<String>,
    tracking_patterns: Vec<String>,
    tracking_params: Vec<String>,
    allowed_extensions: Vec<String>,
    image_host_prefixes: Vec<String>,
    known_image_hosts: Vec<String>,
    min_width: u32,
    min_height: u32,
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

impl ImageFilter {
    /// Compile the filter tables from the options.
    pub fn new(options: &ScraperOptions) -> Result<Self> {
        let union = options.exclude_patterns.join("|");
        let lexical = RegexBuilder::new(&union)
            .case_insensitive(true)
            .build()
            .map_err(|e| LeadImageError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            lexical,
            tracking_domains: lowercase_all(&options.tracking_domains),
            tracking_patterns: lowercase_all(&options.tracking_patterns),
            tracking_params: lowercase_all(&options.tracking_params),
            allowed_extensions: lowercase_all(&options.allowed_extensions),
            image_host_prefixes: lowercase_all(&options.image_host_prefixes),
            known_image_hosts: lowercase_all(&options.known_image_hosts),
            min_width: options.min_image_width,
            min_height: options.min_image_height,
        })
    }

    /// Combined check: URL rules, then element rules when an element is given.
    pub fn exclude(&self, url: &str, element: Option<&ElementRef>) -> bool {
        if self.exclude_url(url) {
            return true;
        }
        element.map_or(false, |el| self.exclude_element(el))
    }

    /// Whether a URL is excluded on its own.
    pub fn exclude_url(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return true,
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return true;
        }

        if self.lexical.is_match(url) {
            return true;
        }

        let url_lower = url.to_lowercase();
        let host = parsed.host_str().unwrap_or("").to_lowercase();

        if self.is_tracking(&host, &url_lower, &parsed) {
            return true;
        }

        if is_single_pixel(&url_lower) {
            return true;
        }

        match utils::path_extension(&parsed) {
            Some(ext) => !self.allowed_extensions.iter().any(|allowed| *allowed == ext),
            None => !self.looks_like_image_host(&host),
        }
    }

    /// Whether an element's alt text, classes or declared size exclude it.
    pub fn exclude_element(&self, element: &ElementRef) -> bool {
        let alt = dom_utils::alt_text(element);
        if !alt.is_empty() && self.lexical.is_match(&alt) {
            return true;
        }

        let classes = element
            .value()
            .classes()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if !classes.is_empty() && self.lexical.is_match(&classes) {
            return true;
        }

        let too_narrow = element
            .value()
            .attr("width")
            .and_then(utils::parse_dimension)
            .map_or(false, |w| w < self.min_width);
        let too_short = element
            .value()
            .attr("height")
            .and_then(utils::parse_dimension)
            .map_or(false, |h| h < self.min_height);

        too_narrow || too_short
    }

    fn is_tracking(&self, host: &str, url_lower: &str, parsed: &Url) -> bool {
        let tracking_host = self
            .tracking_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)));
        if tracking_host {
            return true;
        }

        if self
            .tracking_patterns
            .iter()
            .any(|pattern| url_lower.contains(pattern.as_str()))
        {
            return true;
        }

        let file_name = parsed.path().rsplit('/').next().unwrap_or("").to_lowercase();
        if REGEXPS.pixel_file.is_match(&file_name) {
            return true;
        }

        let query = parsed.query().unwrap_or("").to_lowercase();
        self.tracking_params
            .iter()
            .any(|param| query.contains(param.as_str()))
    }

    fn looks_like_image_host(&self, host: &str) -> bool {
        self.image_host_prefixes
            .iter()
            .any(|prefix| host.starts_with(prefix.as_str()))
            || self.known_image_hosts.iter().any(|known| known == host)
    }
}

/// `width=1`, `height=1` as whole query values, or a literal `1x1`.
fn is_single_pixel(url_lower: &str) -> bool {
    if url_lower.contains("1x1") {
        return true;
    }
    ["width=1", "height=1"].iter().any(|marker| {
        url_lower.match_indices(marker).any(|(start, _)| {
            let end = start + marker.len();
            url_lower[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_ascii_digit())
        })
    })
}
