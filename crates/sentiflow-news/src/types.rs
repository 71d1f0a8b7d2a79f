//! NewsAPI response types.
//!
//! Model the JSON returned by `GET /v2/everything`. Every field NewsAPI may
//! omit or null out is optional so one bad article never fails a page.

use serde::Deserialize;

/// Successful `/v2/everything` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EverythingResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
}

/// One article as NewsAPI reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default)]
    pub source: Option<NewsSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    /// RFC 3339 timestamp, e.g. `"2025-06-14T09:30:00Z"`.
    #[serde(default)]
    pub published_at: Option<String>,
    /// First ~200 characters of the body, suffixed with `"[+N chars]"`.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Error body: `{"status": "error", "code": "...", "message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
