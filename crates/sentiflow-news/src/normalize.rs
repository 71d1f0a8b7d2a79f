//! Normalization of NewsAPI articles into [`RawArticle`]s.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use sentiflow_core::RawArticle;

use crate::types::NewsArticle;

/// Title NewsAPI substitutes for articles pulled by the publisher.
const REMOVED: &str = "[Removed]";

static TRUNCATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[\+\d+ chars\]\s*$").expect("valid truncation regex"));

/// Remove NewsAPI's trailing `"[+1234 chars]"` marker.
#[must_use]
pub fn strip_truncation_marker(content: &str) -> String {
    TRUNCATION_MARKER.replace(content, "").trim().to_string()
}

/// Parses an RFC 3339 timestamp into UTC.
///
/// Returns `None` if the string is not a valid timestamp.
#[must_use]
pub fn parse_published_at(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Converts a NewsAPI article into a [`RawArticle`].
///
/// Returns `None` for removed articles. The URL is trimmed, and a blank URL
/// becomes `None`. Content falls back to the description when NewsAPI sends
/// none.
#[must_use]
pub fn normalize_article(article: NewsArticle) -> Option<RawArticle> {
    let removed = article.title.as_deref().map(str::trim) == Some(REMOVED);
    if removed {
        return None;
    }

    let content = article
        .content
        .as_deref()
        .map(strip_truncation_marker)
        .filter(|c| !c.is_empty())
        .or_else(|| {
            article
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
        });

    let url = article
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    Some(RawArticle {
        title: article.title,
        url,
        content,
        description: article.description,
        published_at: article.published_at.as_deref().and_then(parse_published_at),
        source_name: article.source.and_then(|s| s.name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewsSource;

    fn article(title: &str, content: Option<&str>, description: Option<&str>) -> NewsArticle {
        NewsArticle {
            source: Some(NewsSource {
                id: None,
                name: Some("Mint".to_string()),
            }),
            author: None,
            title: Some(title.to_string()),
            description: description.map(str::to_string),
            url: Some("https://example.com/a".to_string()),
            url_to_image: None,
            published_at: Some("2025-06-14T09:30:00Z".to_string()),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn strips_char_count_marker() {
        assert_eq!(
            strip_truncation_marker("Swiggy raised funds from investors… [+2841 chars]"),
            "Swiggy raised funds from investors…"
        );
    }

    #[test]
    fn leaves_unmarked_content_alone() {
        assert_eq!(strip_truncation_marker("plain body"), "plain body");
        assert_eq!(
            strip_truncation_marker("[+12 chars] in the middle"),
            "[+12 chars] in the middle"
        );
    }

    #[test]
    fn removed_articles_are_dropped() {
        assert!(normalize_article(article("[Removed]", Some("x"), None)).is_none());
    }

    #[test]
    fn content_falls_back_to_description() {
        let raw = normalize_article(article("T", None, Some("  the summary "))).unwrap();
        assert_eq!(raw.content.as_deref(), Some("the summary"));

        let raw = normalize_article(article("T", Some(" [+40 chars]"), Some("desc"))).unwrap();
        assert_eq!(raw.content.as_deref(), Some("desc"));
    }

    #[test]
    fn maps_source_and_timestamp() {
        let raw = normalize_article(article("T", Some("body"), None)).unwrap();
        assert_eq!(raw.source_name.as_deref(), Some("Mint"));
        assert_eq!(
            raw.published_at.map(|d| d.to_rfc3339()),
            Some("2025-06-14T09:30:00+00:00".to_string())
        );
    }

    #[test]
    fn url_is_trimmed_and_blank_url_dropped() {
        let mut padded = article("T", Some("body"), None);
        padded.url = Some("  https://example.com/a\t".to_string());
        let raw = normalize_article(padded).unwrap();
        assert_eq!(raw.url.as_deref(), Some("https://example.com/a"));

        let mut blank = article("T", Some("body"), None);
        blank.url = Some("   ".to_string());
        assert!(normalize_article(blank).unwrap().url.is_none());
    }

    #[test]
    fn bad_timestamp_becomes_none() {
        assert!(parse_published_at("yesterday").is_none());
        assert!(parse_published_at("2025-06-14T09:30:00+05:30").is_some());
    }
}
