//! Article record input and output.
//!
//! Input records are JSON objects with at least a `url` and usually a `title`.
//! Every field is preserved in the output, in its original order, with two
//! additions: `image` (the selected image or `null`) and
//! `processing_timestamp` (Unix seconds as a float).
//!
//! Each article gets its own folder under the output directory, named after
//! its sanitized title, holding `image.jpg` and `article_data.json`.

use crate::candidate::{ImageCandidate, SourceMethod};
use crate::error::{LeadImageError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const IMAGE_FILE_NAME: &str = "image.jpg";
pub const ARTICLE_DATA_FILE_NAME: &str = "article_data.json";

const MAX_FOLDER_NAME_CHARS: usize = 100;
const UNTITLED: &str = "Untitled";

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One article as read from disk. Unknown fields are kept as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleRecord {
    fields: Map<String, Value>,
}

/// The `image` entry written for an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub url: String,
    pub filename: String,
    /// Path of the image relative to the output directory.
    pub local_path: String,
    pub relevance_score: u8,
    pub source_method: SourceMethod,
}

impl ImageInfo {
    pub fn new(candidate: &ImageCandidate, folder_name: &str) -> Self {
        Self {
            url: candidate.url.clone(),
            filename: IMAGE_FILE_NAME.to_string(),
            local_path: format!("{}/{}", folder_name, IMAGE_FILE_NAME),
            relevance_score: candidate.score,
            source_method: candidate.source,
        }
    }
}

impl ArticleRecord {
    /// Read a record; anything but a JSON object is rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(LeadImageError::Parse(format!(
                "article record must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The title, or `Untitled` when missing or not a string.
    pub fn title(&self) -> &str {
        self.fields
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(UNTITLED)
    }

    /// The canonical article URL, if present and non-empty.
    pub fn url(&self) -> Option<&str> {
        self.fields
            .get("url")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set `image` and stamp `processing_timestamp` with the current time.
    pub fn finish(&mut self, image: Option<ImageInfo>) -> Result<()> {
        let image = match image {
            Some(info) => serde_json::to_value(info)?,
            None => Value::Null,
        };
        self.fields.insert("image".to_string(), image);
        self.fields.insert(
            "processing_timestamp".to_string(),
            Value::from(unix_timestamp()),
        );
        Ok(())
    }

    /// Write `article_data.json` into `folder`, pretty-printed with non-ASCII
    /// characters kept as they are.
    pub fn write_to(&self, folder: &Path) -> Result<PathBuf> {
        let path = folder.join(ARTICLE_DATA_FILE_NAME);
        let json = serde_json::to_string_pretty(&self.fields)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn unix_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// Make a title safe to use as a folder name.
///
/// Filesystem-reserved characters become `_`, whitespace runs collapse to one
/// space, the result is cut to 100 characters and stripped of leading and
/// trailing dots and spaces. An empty result becomes `unnamed_article`.
pub fn sanitize_folder_name(title: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(title, "_");
    let collapsed = WHITESPACE.replace_all(replaced.trim(), " ");
    let cut: String = collapsed.chars().take(MAX_FOLDER_NAME_CHARS).collect();
    let stripped = cut.trim_matches(|c: char| c == '.' || c == ' ');

    if stripped.is_empty() {
        "unnamed_article".to_string()
    } else {
        stripped.to_string()
    }
}

/// Output folder names handed out during one run.
///
/// Articles run concurrently, so two records with the same sanitized title
/// must not share a folder. The first keeps the plain name, later ones get
/// `_2`, `_3`, and so on.
#[derive(Debug, Default)]
pub(crate) struct FolderNames {
    taken: Mutex<HashSet<String>>,
}

impl FolderNames {
    pub(crate) fn claim(&self, title: &str) -> String {
        let base = sanitize_folder_name(title);
        let mut taken = match self.taken.lock() {
            Ok(taken) => taken,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while !taken.insert(name.clone()) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        name
    }
}

/// All `*.json` files directly inside `dir`, sorted by path.
pub fn list_input_records(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_and_trims() {
        assert_eq!(sanitize_folder_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_folder_name("  Breaking:   news \t today  "), "Breaking_ news today");
        assert_eq!(sanitize_folder_name("...hidden. "), "hidden");
        assert_eq!(sanitize_folder_name(""), "unnamed_article");
        assert_eq!(sanitize_folder_name(" . . "), "unnamed_article");
    }

    #[test]
    fn sanitize_cuts_to_100_chars() {
        let long = "é".repeat(150);
        assert_eq!(sanitize_folder_name(&long).chars().count(), 100);
    }

    #[test]
    fn record_fields_and_defaults() {
        let record = ArticleRecord::from_json(r#"{"url":" https://e.com/a ","section":"world"}"#).unwrap();
        assert_eq!(record.title(), "Untitled");
        assert_eq!(record.url(), Some("https://e.com/a"));

        let record = ArticleRecord::from_json(r#"{"title":"T","url":""}"#).unwrap();
        assert_eq!(record.url(), None);

        assert!(matches!(
            ArticleRecord::from_json("[1,2]"),
            Err(LeadImageError::Parse(_))
        ));
    }

    #[test]
    fn output_keeps_key_order_and_unicode() {
        let dir = TempDir::new().unwrap();
        let mut record =
            ArticleRecord::from_json(r#"{"url":"https://e.com/a","title":"Café","z":1,"a":2}"#).unwrap();
        let candidate = ImageCandidate::new("https://cdn.e.com/x.jpg", 87, SourceMethod::OpenGraph);
        record.finish(Some(ImageInfo::new(&candidate, "Café"))).unwrap();
        let path = record.write_to(dir.path()).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("\"title\": \"Café\""));
        assert!(text.contains("\n  \"z\": 1"));
        let keys: Vec<_> = serde_json::from_str::<Map<String, Value>>(&text)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["url", "title", "z", "a", "image", "processing_timestamp"]);

        let written: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(written["image"]["local_path"], "Café/image.jpg");
        assert_eq!(written["image"]["source_method"], "opengraph");
        assert_eq!(written["image"]["relevance_score"], 87);
        assert!(written["processing_timestamp"].as_f64().unwrap() > 1.6e9);
    }

    #[test]
    fn missing_image_is_null() {
        let mut record = ArticleRecord::from_json(r#"{"url":"https://e.com/a"}"#).unwrap();
        record.finish(None).unwrap();
        assert_eq!(record.get("image"), Some(&Value::Null));
    }

    #[test]
    fn repeated_titles_get_distinct_folders() {
        let names = FolderNames::default();
        assert_eq!(names.claim("Flood: city on alert"), "Flood_ city on alert");
        assert_eq!(names.claim("Flood: city on alert"), "Flood_ city on alert_2");
        assert_eq!(names.claim("Flood/ city on alert"), "Flood_ city on alert_3");
        assert_eq!(names.claim("Other"), "Other");
    }

    #[test]
    fn lists_only_json_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.json", "a.json", "notes.txt", "c.JSON"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("d.json")).unwrap();

        let names: Vec<_> = list_input_records(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.json", "b.json", "c.JSON"]);
    }
}
