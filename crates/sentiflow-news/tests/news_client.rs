//! Integration tests for `NewsClient` using wiremock HTTP mocks.

use chrono::NaiveDate;
use sentiflow_core::{QuerySpec, Tier};
use sentiflow_news::{FetchOptions, NewsClient, NewsError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(page_size: u32) -> FetchOptions {
    FetchOptions {
        page_size,
        max_pages: 5,
        inter_page_delay_ms: 0,
        max_concurrent_queries: 2,
        max_retries: 2,
        retry_backoff_base_ms: 0,
        ..FetchOptions::default()
    }
}

fn test_client(base_url: &str, keys: &[&str], page_size: u32) -> NewsClient {
    NewsClient::with_base_url(keys.iter().copied(), 5, base_url, options(page_size))
        .expect("client construction should not fail")
}

fn spec(name: &str) -> QuerySpec {
    QuerySpec {
        tier: Tier::New,
        category_id: 28,
        category_name: Some("FoodTech".to_string()),
        entity_ids: vec![],
        name_clause: format!("\"{name}\""),
        keyword_clause: "\"FoodTech\"".to_string(),
        from: NaiveDate::from_ymd_opt(2025, 5, 16).unwrap(),
        to: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
    }
}

fn article(n: u32) -> serde_json::Value {
    serde_json::json!({
        "source": { "id": null, "name": "Mint" },
        "author": "Reporter",
        "title": format!("Swiggy story {n}"),
        "description": "Swiggy news",
        "url": format!("https://news.example/{n}"),
        "urlToImage": null,
        "publishedAt": "2025-06-14T09:30:00Z",
        "content": format!("Swiggy body {n}… [+1200 chars]")
    })
}

fn page(articles: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "totalResults": 99,
        "articles": articles
    })
}

#[tokio::test]
async fn walks_pages_until_a_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(1), article(2)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(3)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 2);
    let articles = client
        .fetch_query(&spec("Swiggy"))
        .await
        .expect("should fetch pages");

    assert_eq!(articles.len(), 3);
    assert_eq!(articles[0].url.as_deref(), Some("https://news.example/1"));
    assert_eq!(articles[0].content.as_deref(), Some("Swiggy body 1…"));
    assert_eq!(articles[2].source_name.as_deref(), Some("Mint"));
}

#[tokio::test]
async fn rotates_api_keys_per_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .and(query_param("apiKey", "k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(1)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .and(query_param("apiKey", "k2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1", "k2"], 1);
    let articles = client.fetch_query(&spec("Swiggy")).await.unwrap();
    assert_eq!(articles.len(), 1);
}

#[tokio::test]
async fn stops_at_max_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(1)])))
        .expect(5)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 1);
    let articles = client.fetch_query(&spec("Swiggy")).await.unwrap();
    assert_eq!(articles.len(), 5);
}

#[tokio::test]
async fn first_page_api_error_fails_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["bad"], 2);
    let err = client
        .fetch_query(&spec("Swiggy"))
        .await
        .expect_err("invalid key should fail");
    match err {
        NewsError::ApiError { code, message } => {
            assert_eq!(code, "apiKeyInvalid");
            assert!(message.contains("invalid"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn later_page_failure_keeps_earlier_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(1), article(2)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": "error",
            "code": "parameterInvalid",
            "message": "bad page"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 2);
    let articles = client.fetch_query(&spec("Swiggy")).await.unwrap();
    assert_eq!(articles.len(), 2);
}

#[tokio::test]
async fn result_limit_ends_paging_normally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(1)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(426).set_body_json(serde_json::json!({
            "status": "error",
            "code": "maximumResultsReached",
            "message": "You have requested too many results."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 1);
    let articles = client.fetch_query(&spec("Swiggy")).await.unwrap();
    assert_eq!(articles.len(), 1);
}

#[tokio::test]
async fn rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "status": "error",
            "code": "rateLimited",
            "message": "slow down"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(7)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 2);
    let articles = client.fetch_query(&spec("Swiggy")).await.unwrap();
    assert_eq!(articles.len(), 1);
}

#[tokio::test]
async fn persistent_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 2);
    let err = client.fetch_query(&spec("Swiggy")).await.unwrap_err();
    assert!(matches!(err, NewsError::Transient { status: 503, .. }));
}

#[tokio::test]
async fn removed_articles_are_filtered_out() {
    let server = MockServer::start().await;
    let removed = serde_json::json!({
        "source": { "id": null, "name": "[Removed]" },
        "title": "[Removed]",
        "description": "[Removed]",
        "url": "https://removed.com",
        "publishedAt": "1970-01-01T00:00:00Z",
        "content": "[Removed]"
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(1), removed])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 100);
    let articles = client.fetch_query(&spec("Swiggy")).await.unwrap();
    assert_eq!(articles.len(), 1);
}

#[tokio::test]
async fn fetch_all_skips_failed_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", spec("Swiggy").query()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![article(1), article(2)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", spec("Zomato").query()))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": "error",
            "code": "parameterInvalid",
            "message": "bad query"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), &["k1"], 100);
    let report = client
        .fetch_all(&[spec("Swiggy"), spec("Zomato")])
        .await;

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.articles.len(), 2);
}
