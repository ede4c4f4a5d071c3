//! Evidence artifacts and the small text/URL checks the validator relies on.

use reqwest::Url;
use serde::{Serialize, Deserialize};

/// Reference to an uploaded file, as handed over by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
}

/// Proof that a tool session happened: either a link or an uploaded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    Link(String),
    Blob(BlobRef),
}

impl Evidence {
    pub fn is_present(&self) -> bool {
        match self {
            Evidence::Link(url) => !url.trim().is_empty(),
            Evidence::Blob(blob) => !blob.name.trim().is_empty() && blob.size_bytes > 0,
        }
    }
}

/// Whitespace-separated word count; runs of whitespace count once.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn parse_http(url: &str) -> Option<Url> {
    let parsed = Url::parse(url.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed),
        _ => None,
    }
}

/// Whether a screenshot URL plausibly points at an image.
pub fn is_image_url(url: &str) -> bool {
    let Some(parsed) = parse_http(url) else {
        return false;
    };
    let lower = url.to_lowercase();
    const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".webp"];
    let host = parsed.host_str().unwrap_or_default();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
        || host.ends_with("imgur.com")
        || host == "github.com"
}

/// `https://github.com/<owner>/<repo>[/...]`
pub fn is_github_repo_url(url: &str) -> bool {
    let Some(parsed) = parse_http(url) else {
        return false;
    };
    if parsed.host_str() != Some("github.com") {
        return false;
    }
    parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count() >= 2)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_words_ignores_extra_whitespace() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("one  two\n three\tfour "), 4);
    }

    #[test]
    fn evidence_presence() {
        assert!(Evidence::Link("https://imgur.com/a.png".into()).is_present());
        assert!(!Evidence::Link("  ".into()).is_present());
        let blob = BlobRef { name: "capture.pcap".into(), content_type: None, size_bytes: 2048 };
        assert!(Evidence::Blob(blob).is_present());
        let empty = BlobRef { name: "capture.pcap".into(), content_type: None, size_bytes: 0 };
        assert!(!Evidence::Blob(empty).is_present());
    }

    #[test]
    fn evidence_deserializes_from_string_or_object() {
        let link: Evidence = serde_json::from_str(r#""https://example.com/shot.png""#).unwrap();
        assert!(matches!(link, Evidence::Link(_)));
        let blob: Evidence = serde_json::from_str(r#"{"name":"a.png","sizeBytes":10}"#).unwrap();
        assert!(matches!(blob, Evidence::Blob(_)));
    }

    #[test]
    fn url_checks() {
        assert!(is_image_url("https://i.imgur.com/abc"));
        assert!(is_image_url("https://cdn.example.com/shot.PNG"));
        assert!(!is_image_url("not a url"));
        assert!(!is_image_url("ftp://example.com/a.png"));

        assert!(is_github_repo_url("https://github.com/alice/pcap-writeups"));
        assert!(!is_github_repo_url("https://github.com/alice"));
        assert!(!is_github_repo_url("https://gitlab.com/alice/repo"));
    }
}
