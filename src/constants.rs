//! Fixed tables used by the filter, the scorer and the heuristic parse.
//!
//! Tables that users may want to tune are only defaults here; they are copied
//! into [`ScraperOptions`](crate::ScraperOptions) and read from there. The
//! scoring term lists and the readability regexes are fixed.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "svg"];

pub const EXCLUDE_PATTERNS: &[&str] = &[
    r"logo",
    r"icon",
    r"favicon",
    r"avatar",
    r"profile",
    r"advertisement",
    r"ad[_-]",
    r"banner",
    r"widget",
    r"social",
    r"share",
    r"button",
    r"arrow",
    r"play",
    r"thumbnail.*small",
    r"thumb.*\d+x\d+",
    r"\d+x\d+.*thumb",
    r"brand",
    r"header",
    r"masthead",
    r"watermark",
    r"signature",
    r"emblem",
    r"badge",
    r"seal",
    r"mark",
];

pub const TRACKING_DOMAINS: &[&str] = &[
    "facebook.com",
    "google-analytics.com",
    "googletagmanager.com",
    "doubleclick.net",
    "googlesyndication.com",
    "googleadservices.com",
    "outbrain.com",
    "taboola.com",
    "amazon-adsystem.com",
];

pub const TRACKING_PATTERNS: &[&str] = &[
    "facebook.com/tr",
    "/tr?",
    "/tr/",
    "/pixel?",
    "/track?",
    "/beacon?",
    "/analytics?",
    "google-analytics.com",
    "googletagmanager.com",
    "spacer.gif",
    "transparent.gif",
    "1x1.gif",
];

pub const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "utm_", "pixel"];

pub const IMAGE_HOST_PREFIXES: &[&str] = &["images.", "img.", "cdn.", "assets."];

pub const KNOWN_IMAGE_HOSTS: &[&str] = &["static.toiimg.com"];

// Scorer term tables. Terms marked as tokens in `scoring.rs` only match when
// delimited by non-alphanumeric characters.

pub const HERO_TERMS: &[&str] = &["featured", "main", "hero", "cover", "article"];
pub const SIZE_TERMS: &[&str] = &["large", "big", "full", "original"];
pub const CONTENT_TERMS: &[&str] = &["photo", "image", "pic", "img"];
pub const LOGO_TERMS: &[&str] = &[
    "logo",
    "brand",
    "header",
    "masthead",
    "watermark",
    "signature",
    "emblem",
    "badge",
    "seal",
    "mark",
];
pub const SITE_BRAND_TERMS: &[&str] = &["timesofindia", "company", "corp"];
pub const SITE_BRAND_TOKENS: &[&str] = &["toi"];
pub const TRACKING_TERMS: &[&str] = &["analytics", "tracking", "pixel?", "beacon?"];
pub const SMALL_TERMS: &[&str] = &["thumb", "small", "mini", "icon"];
pub const AD_TERMS: &[&str] = &["banner", "widget", "sidebar"];
pub const AD_TOKENS: &[&str] = &["ad"];
pub const SOCIAL_TERMS: &[&str] = &["social", "share", "profile", "avatar"];
pub const LOGO_WIDTHS: &[&str] = &["150x", "200x", "100x", "50x"];
pub const LOGO_HEIGHTS: &[&str] = &["x150", "x200", "x100", "x50"];

pub const ALT_POSITIVE_TERMS: &[&str] = &["article", "story", "news", "main", "photo"];
pub const ALT_NEGATIVE_TERMS: &[&str] = &["logo", "icon", "button", "arrow"];
pub const CLASS_POSITIVE_TERMS: &[&str] = &["featured", "hero", "main"];
pub const PARENT_POSITIVE_TERMS: &[&str] = &["article", "content"];
pub const PARENT_NEGATIVE_TERMS: &[&str] = &["sidebar", "footer"];

pub const CONTEXT_POSITIVE_TERMS: &[&str] =
    &["article", "content", "story", "body", "post", "main", "entry"];
pub const CONTEXT_NEGATIVE_TERMS: &[&str] =
    &["header", "nav", "footer", "sidebar", "menu", "widget"];

/// Selectors tried in order to locate the readable article body.
pub const ARTICLE_BODY_SELECTORS: &[&str] = &[
    "[itemprop='articleBody']",
    "article",
    "main",
    "[role='main']",
    ".entry-content",
    ".post-content",
    ".article-body",
    ".article-content",
    ".story-body",
    "#content",
];

/// Minimum text length for a body container to count as readable content.
pub const MIN_BODY_TEXT_LEN: usize = 140;

/// Compiled regexes shared across the crate.
pub struct Regexps {
    pub unlikely_candidates: Regex,
    pub ok_maybe_its_a_candidate: Regex,
    pub positive: Regex,
    pub negative: Regex,
    pub facebook_pixel: Regex,
    pub pixel_file: Regex,
}

pub static REGEXPS: Lazy<Regexps> = Lazy::new(|| Regexps {
    unlikely_candidates: Regex::new(
        r"(?i)-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    )
    .unwrap(),
    ok_maybe_its_a_candidate: Regex::new(r"(?i)and|article|body|column|content|main|shadow")
        .unwrap(),
    positive: Regex::new(
        r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story",
    )
    .unwrap(),
    negative: Regex::new(
        r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget",
    )
    .unwrap(),
    facebook_pixel: Regex::new(r"facebook\.com/tr|/tr\?|fb_?pixel").unwrap(),
    pixel_file: Regex::new(r"(?:^|[/_.\-])pixel(?:[_.\-]|$)").unwrap(),
});
