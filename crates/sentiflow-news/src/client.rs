//! HTTP client for the NewsAPI `/v2/everything` endpoint.
//!
//! Wraps `reqwest` with key rotation, retry on transient failures, page
//! walking and article normalization. Use [`NewsClient::new`] for production
//! or [`NewsClient::with_base_url`] to point at a mock server in tests.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode, Url};
use sentiflow_core::{QuerySpec, RawArticle};

use crate::error::NewsError;
use crate::keys::KeyRing;
use crate::normalize::normalize_article;
use crate::retry::retry_with_backoff;
use crate::types::{ErrorBody, EverythingResponse};

const DEFAULT_BASE_URL: &str = "https://newsapi.org/";

/// NewsAPI never serves more than 100 articles per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Request shaping and politeness settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub language: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub inter_page_delay_ms: u64,
    pub max_concurrent_queries: usize,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            page_size: MAX_PAGE_SIZE,
            max_pages: 5,
            inter_page_delay_ms: 1_200,
            max_concurrent_queries: 5,
            max_retries: 3,
            retry_backoff_base_ms: 1_000,
        }
    }
}

/// Result of fanning out over many queries.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub articles: Vec<RawArticle>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Client for NewsAPI.
#[derive(Debug)]
pub struct NewsClient {
    client: Client,
    keys: KeyRing,
    base_url: Url,
    options: FetchOptions,
}

impl NewsClient {
    /// Creates a new client pointed at the production NewsAPI.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::NoApiKeys`] if `keys` holds no usable key, or
    /// [`NewsError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new<I, S>(keys: I, timeout_secs: u64, options: FetchOptions) -> Result<Self, NewsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_base_url(keys, timeout_secs, DEFAULT_BASE_URL, options)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`NewsClient::new`], plus [`NewsError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url<I, S>(
        keys: I,
        timeout_secs: u64,
        base_url: &str,
        options: FetchOptions,
    ) -> Result<Self, NewsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = KeyRing::new(keys)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sentiflow/0.1 (news-sentiment)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| NewsError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let options = FetchOptions {
            page_size: options.page_size.clamp(1, MAX_PAGE_SIZE),
            max_pages: options.max_pages.max(1),
            max_concurrent_queries: options.max_concurrent_queries.max(1),
            ..options
        };

        Ok(Self {
            client,
            keys,
            base_url,
            options,
        })
    }

    #[must_use]
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Fetch every query, at most `max_concurrent_queries` at a time.
    ///
    /// A failing query is logged and counted; the others still contribute.
    /// Articles are returned in completion order, not query order.
    pub async fn fetch_all(&self, specs: &[QuerySpec]) -> FetchReport {
        // Iterate by index: the returned future must stay `Send`.
        let results: Vec<(&QuerySpec, Result<Vec<RawArticle>, NewsError>)> =
            stream::iter(0..specs.len())
                .map(|i| async move { (&specs[i], self.fetch_query(&specs[i]).await) })
                .buffer_unordered(self.options.max_concurrent_queries)
                .collect()
                .await;

        let mut report = FetchReport::default();
        for (spec, result) in results {
            match result {
                Ok(articles) => {
                    tracing::info!(
                        query = %spec.label(),
                        articles = articles.len(),
                        "completed news query"
                    );
                    report.succeeded += 1;
                    report.articles.extend(articles);
                }
                Err(e) => {
                    tracing::error!(query = %spec.label(), error = %e, "news query failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            queries = specs.len(),
            failed = report.failed,
            articles = report.articles.len(),
            "fetched news across all queries"
        );
        report
    }

    /// Fetch all pages for one query.
    ///
    /// Paging stops on a short page, at `max_pages`, or when NewsAPI reports
    /// its result limit. A failure after the first page keeps the pages
    /// already collected.
    ///
    /// # Errors
    ///
    /// Returns the first page's error if that page cannot be fetched.
    pub async fn fetch_query(&self, spec: &QuerySpec) -> Result<Vec<RawArticle>, NewsError> {
        let label = spec.label();
        let page_size = self.options.page_size;
        let mut collected = Vec::new();

        for page in 1..=self.options.max_pages {
            if page > 1 {
                tokio::time::sleep(Duration::from_millis(self.options.inter_page_delay_ms)).await;
            }

            let response = match self.fetch_page(spec, page).await {
                Ok(response) => response,
                Err(e) if e.is_result_limit() => {
                    tracing::info!(query = %label, page, "NewsAPI result limit reached");
                    break;
                }
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        query = %label,
                        page,
                        error = %e,
                        "page fetch failed; keeping earlier pages"
                    );
                    break;
                }
            };

            let count = response.articles.len();
            tracing::debug!(
                query = %label,
                page,
                count,
                total = response.total_results,
                "fetched page"
            );
            collected.extend(response.articles.into_iter().filter_map(normalize_article));

            if count < page_size as usize {
                break;
            }
        }

        Ok(collected)
    }

    async fn fetch_page(
        &self,
        spec: &QuerySpec,
        page: u32,
    ) -> Result<EverythingResponse, NewsError> {
        retry_with_backoff(
            self.options.max_retries,
            self.options.retry_backoff_base_ms,
            || {
                let url = self.build_url(spec, page, self.keys.next_key());
                async move { self.request_page(&url).await }
            },
        )
        .await
    }

    /// Builds the `/v2/everything` URL with properly encoded query parameters.
    fn build_url(&self, spec: &QuerySpec, page: u32, api_key: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}v2/everything", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &spec.query());
            pairs.append_pair("language", &self.options.language);
            pairs.append_pair("from", &spec.from.format("%Y-%m-%d").to_string());
            pairs.append_pair("to", &spec.to.format("%Y-%m-%d").to_string());
            pairs.append_pair("sortBy", "publishedAt");
            pairs.append_pair("searchIn", "title,description");
            pairs.append_pair("pageSize", &self.options.page_size.to_string());
            pairs.append_pair("page", &page.to_string());
            pairs.append_pair("apiKey", api_key);
        }
        url
    }

    /// Sends one GET and classifies the response.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Transient`] on HTTP 429 or 5xx.
    /// - [`NewsError::ApiError`] on any other non-2xx status, or a 2xx body
    ///   whose `status` is `"error"`.
    /// - [`NewsError::Http`] on network failure.
    /// - [`NewsError::Deserialize`] if the body does not match the expected shape.
    async fn request_page(&self, url: &Url) -> Result<EverythingResponse, NewsError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let context = redact_key(url);

        if !status.is_success() {
            let error: Option<ErrorBody> = serde_json::from_str(&body).ok();
            let code = error
                .as_ref()
                .and_then(|e| e.code.clone())
                .unwrap_or_else(|| status.as_u16().to_string());
            let message = error
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                return Err(NewsError::Transient {
                    status: status.as_u16(),
                    message,
                });
            }
            return Err(NewsError::ApiError { code, message });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| NewsError::Deserialize {
                context: context.clone(),
                source: e,
            })?;
        Self::check_api_error(&value)?;

        serde_json::from_value(value).map_err(|e| NewsError::Deserialize { context, source: e })
    }

    /// Checks the top-level `"status"` field of a 2xx body.
    fn check_api_error(body: &serde_json::Value) -> Result<(), NewsError> {
        if body.get("status").and_then(serde_json::Value::as_str) == Some("error") {
            let field = |name: &str| {
                body.get(name)
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown")
                    .to_string()
            };
            return Err(NewsError::ApiError {
                code: field("code"),
                message: field("message"),
            });
        }
        Ok(())
    }
}

/// The request URL with the `apiKey` value masked, for error context.
fn redact_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apiKey" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
