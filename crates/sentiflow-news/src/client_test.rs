use chrono::NaiveDate;
use sentiflow_core::Tier;

use super::*;

fn test_client(base_url: &str) -> NewsClient {
    NewsClient::with_base_url(["test-key"], 30, base_url, FetchOptions::default())
        .expect("client construction should not fail")
}

fn spec() -> QuerySpec {
    QuerySpec {
        tier: Tier::Tracked,
        category_id: 28,
        category_name: Some("FoodTech".to_string()),
        entity_ids: vec![],
        name_clause: "\"Swiggy\" OR \"Zomato\"".to_string(),
        keyword_clause: "\"food delivery\"".to_string(),
        from: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
        to: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
    }
}

#[test]
fn build_url_constructs_everything_query() {
    let client = test_client("https://newsapi.org");
    let url = client.build_url(&spec(), 2, "k1");

    assert_eq!(url.path(), "/v2/everything");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let get = |k: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == k)
            .map(|(_, v)| v.as_str())
    };
    assert_eq!(
        get("q"),
        Some("(\"Swiggy\" OR \"Zomato\") AND (\"food delivery\")")
    );
    assert_eq!(get("language"), Some("en"));
    assert_eq!(get("from"), Some("2025-06-14"));
    assert_eq!(get("to"), Some("2025-06-15"));
    assert_eq!(get("sortBy"), Some("publishedAt"));
    assert_eq!(get("searchIn"), Some("title,description"));
    assert_eq!(get("pageSize"), Some("100"));
    assert_eq!(get("page"), Some("2"));
    assert_eq!(get("apiKey"), Some("k1"));
}

#[test]
fn build_url_keeps_base_path_prefix() {
    let client = test_client("http://proxy.local/newsapi/");
    let url = client.build_url(&spec(), 1, "k1");
    assert_eq!(url.path(), "/newsapi/v2/everything");
}

#[test]
fn page_size_is_clamped_to_api_maximum() {
    let client = NewsClient::with_base_url(
        ["k"],
        30,
        "https://newsapi.org",
        FetchOptions {
            page_size: 500,
            max_pages: 0,
            max_concurrent_queries: 0,
            ..FetchOptions::default()
        },
    )
    .unwrap();
    assert_eq!(client.options().page_size, MAX_PAGE_SIZE);
    assert_eq!(client.options().max_pages, 1);
    assert_eq!(client.options().max_concurrent_queries, 1);
}

#[test]
fn redacted_url_hides_api_key() {
    let client = test_client("https://newsapi.org");
    let url = client.build_url(&spec(), 1, "super-secret");
    let redacted = redact_key(&url);
    assert!(!redacted.contains("super-secret"));
    assert!(redacted.contains("apiKey=***") || redacted.contains("apiKey=%2A%2A%2A"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = NewsClient::with_base_url(["k"], 30, "not a url", FetchOptions::default())
        .unwrap_err();
    assert!(matches!(err, NewsError::InvalidBaseUrl { .. }));
}

#[test]
fn missing_keys_are_rejected() {
    let err = NewsClient::new(Vec::<String>::new(), 30, FetchOptions::default()).unwrap_err();
    assert!(matches!(err, NewsError::NoApiKeys));
}
