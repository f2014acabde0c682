//! Small string and URL helpers shared by the filter, scorer and extractors.

use url::Url;

/// Resolve a raw `src`-like value against the article URL.
///
/// Returns `None` for empty values, unparseable references, and anything that
/// does not resolve to an http(s) URL (e.g. `data:` URIs).
pub fn resolve_url(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let resolved = base.join(raw).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Whether `haystack` contains any of `terms` as a plain substring.
pub fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

/// Whether `token` occurs in `haystack` delimited by non-alphanumeric characters.
///
/// Used for short terms such as `ad` that would otherwise match inside
/// unrelated words (`uploads`, `header`, `download`).
pub fn contains_token(haystack: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    haystack.match_indices(token).any(|(start, _)| {
        let end = start + token.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        before_ok && after_ok
    })
}

pub fn contains_any_token(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| contains_token(haystack, token))
}

/// Lowercased extension of the last path segment, without the dot.
///
/// A leading dot (`/.hidden`) does not count as an extension.
pub fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path().rsplit('/').next().unwrap_or("");
    let dot = segment.rfind('.')?;
    if dot == 0 || dot + 1 == segment.len() {
        return None;
    }
    Some(segment[dot + 1..].to_ascii_lowercase())
}

/// First URL token of a `srcset` attribute.
pub fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|entry| entry.split_whitespace().next())
        .filter(|url| !url.is_empty())
}

/// Parse a declared `width`/`height` attribute such as `"640"` or `"640px"`.
pub fn parse_dimension(value: &str) -> Option<u32> {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value).trim();
    value.parse::<u32>().ok()
}

/// The URL lowercased with its query string and fragment removed.
pub fn strip_query(url_lower: &str) -> &str {
    let end = url_lower.find(['?', '#']).unwrap_or(url_lower.len());
    &url_lower[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_reject_data_uri() {
        let base = Url::parse("https://news.example.com/world/story.html").unwrap();
        assert_eq!(
            resolve_url(&base, "/img/a.jpg").unwrap().as_str(),
            "https://news.example.com/img/a.jpg"
        );
        assert_eq!(
            resolve_url(&base, "b.png").unwrap().as_str(),
            "https://news.example.com/world/b.png"
        );
        assert!(resolve_url(&base, "data:image/gif;base64,R0lGOD").is_none());
        assert!(resolve_url(&base, "   ").is_none());
    }

    #[test]
    fn token_matching_ignores_embedded_words() {
        assert!(contains_token("https://x.com/ad/banner.jpg", "ad"));
        assert!(contains_token("ad-slot", "ad"));
        assert!(!contains_token("https://x.com/uploads/header.jpg", "ad"));
        assert!(!contains_token("toilet", "toi"));
        assert!(contains_token("static.toi.com", "toi"));
    }

    #[test]
    fn extension_of_last_segment() {
        let url = Url::parse("https://a.com/x.y/photo.JPG?w=10").unwrap();
        assert_eq!(path_extension(&url).as_deref(), Some("jpg"));
        let url = Url::parse("https://a.com/v1.2/photo").unwrap();
        assert_eq!(path_extension(&url), None);
        let url = Url::parse("https://a.com/.hidden").unwrap();
        assert_eq!(path_extension(&url), None);
    }

    #[test]
    fn srcset_first_token() {
        assert_eq!(
            first_srcset_url(" /a-800.webp 800w, /a-400.webp 400w"),
            Some("/a-800.webp")
        );
        assert_eq!(first_srcset_url(""), None);
    }

    #[test]
    fn dimensions_accept_px_suffix() {
        assert_eq!(parse_dimension("640"), Some(640));
        assert_eq!(parse_dimension(" 80px "), Some(80));
        assert_eq!(parse_dimension("100%"), None);
    }
}
