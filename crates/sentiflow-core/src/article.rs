//! Preparation of fetched articles for persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::RawArticle;

/// Maximum number of characters of article content kept in storage.
pub const MAX_CONTENT_PREVIEW: usize = 300;

const UNTITLED: &str = "untitled";

/// A fetched article normalized into the shape of an `articles` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewArticle {
    /// Build an insertable article from a raw record.
    ///
    /// Returns `None` when the URL is missing or blank. Content falls back to
    /// the description and is cut to a [`MAX_CONTENT_PREVIEW`] preview.
    #[must_use]
    pub fn from_raw(raw: &RawArticle) -> Option<Self> {
        let url = raw.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;

        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED);

        let content = raw
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or_else(|| raw.description.as_deref().map(str::trim))
            .unwrap_or_default();

        Some(Self {
            title: title.to_string(),
            url: url.to_string(),
            content: content_preview(content, MAX_CONTENT_PREVIEW),
            published_at: raw.published_at,
        })
    }
}

/// Truncate `text` to at most `max_chars` characters, backing off to the last
/// space and appending `...` when anything was cut.
#[must_use]
pub fn content_preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let head = &text[..cut];
    let head = match head.rfind(' ') {
        Some(space) => &head[..space],
        None => head,
    };
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_kept_verbatim() {
        assert_eq!(content_preview("  short body  ", 300), "short body");
    }

    #[test]
    fn long_content_is_cut_on_word_boundary() {
        let text = "alpha beta gamma delta";
        assert_eq!(content_preview(text, 13), "alpha beta...");
    }

    #[test]
    fn long_content_without_spaces_is_cut_hard() {
        assert_eq!(content_preview("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn preview_respects_multibyte_characters() {
        let text = "ééééé ééééé";
        assert_eq!(content_preview(text, 8), "ééééé...");
    }

    #[test]
    fn from_raw_requires_url() {
        let raw = RawArticle {
            title: Some("t".to_string()),
            url: Some("   ".to_string()),
            ..RawArticle::default()
        };
        assert!(NewArticle::from_raw(&raw).is_none());
        assert!(NewArticle::from_raw(&RawArticle::default()).is_none());
    }

    #[test]
    fn from_raw_defaults_title_and_falls_back_to_description() {
        let raw = RawArticle {
            title: None,
            url: Some("https://example.com/a".to_string()),
            content: Some(String::new()),
            description: Some("A short description".to_string()),
            ..RawArticle::default()
        };
        let article = NewArticle::from_raw(&raw).unwrap();
        assert_eq!(article.title, "untitled");
        assert_eq!(article.url, "https://example.com/a");
        assert_eq!(article.content, "A short description");
    }

    #[test]
    fn from_raw_truncates_content() {
        let body = "word ".repeat(100);
        let raw = RawArticle {
            title: Some("Title".to_string()),
            url: Some("https://example.com/b".to_string()),
            content: Some(body),
            ..RawArticle::default()
        };
        let article = NewArticle::from_raw(&raw).unwrap();
        assert!(article.content.ends_with("..."));
        assert!(article.content.chars().count() <= MAX_CONTENT_PREVIEW + 3);
    }
}
