//! Offline unit tests for sentiflow-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use chrono::Utc;
use sentiflow_core::{AppConfig, Article, Entity, Environment};
use sentiflow_db::{ArticleRow, EntityRow, PipelineRunRow, PoolConfig};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        entities_path: PathBuf::from("./config/entities.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        news_api_keys: vec!["k".to_string()],
        news_api_base_url: "https://newsapi.org".to_string(),
        news_language: "en".to_string(),
        news_page_size: 100,
        news_max_pages: 5,
        news_request_timeout_secs: 15,
        news_inter_page_delay_ms: 1_200,
        news_max_concurrent_queries: 5,
        news_max_retries: 3,
        news_retry_backoff_base_ms: 1_000,
        scorer_url: "http://localhost:8080".to_string(),
        scorer_batch_size: 32,
        scorer_max_concurrent_batches: 1,
        scorer_entailment_label: "entailment".to_string(),
        scorer_timeout_secs: 120,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn entity_row_converts_to_domain_entity() {
    let id = Uuid::new_v4();
    let row = EntityRow {
        id,
        name: "Swiggy".to_string(),
        category_id: 28,
        description: Some("Food delivery".to_string()),
        image_url: None,
        keywords: vec!["instamart".to_string()],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let entity = Entity::from(row);
    assert_eq!(entity.id, id);
    assert_eq!(entity.name, "Swiggy");
    assert_eq!(entity.category_id, 28);
    assert_eq!(entity.keywords, vec!["instamart".to_string()]);
}

#[test]
fn article_row_converts_to_domain_article() {
    let id = Uuid::new_v4();
    let row = ArticleRow {
        id,
        title: "Swiggy raised funds".to_string(),
        url: "https://news.example/1".to_string(),
        content: "A big round.".to_string(),
        published_at: None,
        created_at: Utc::now(),
    };

    let article = Article::from(row);
    assert_eq!(article.id, id);
    assert_eq!(article.combined_text(), "Swiggy raised funds. A big round.");
}

/// Compile-time smoke test: confirm that [`PipelineRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn pipeline_run_row_has_expected_fields() {
    let row = PipelineRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        records_processed: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.trigger_source, "cli");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
}
