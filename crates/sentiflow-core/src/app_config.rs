use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub entities_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub news_api_keys: Vec<String>,
    pub news_api_base_url: String,
    pub news_language: String,
    pub news_page_size: u32,
    pub news_max_pages: u32,
    pub news_request_timeout_secs: u64,
    pub news_inter_page_delay_ms: u64,
    pub news_max_concurrent_queries: usize,
    pub news_max_retries: u32,
    pub news_retry_backoff_base_ms: u64,
    pub scorer_url: String,
    pub scorer_batch_size: usize,
    pub scorer_max_concurrent_batches: usize,
    pub scorer_entailment_label: String,
    pub scorer_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("entities_path", &self.entities_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "news_api_keys",
                &format!("[{} redacted]", self.news_api_keys.len()),
            )
            .field("news_api_base_url", &self.news_api_base_url)
            .field("news_language", &self.news_language)
            .field("news_page_size", &self.news_page_size)
            .field("news_max_pages", &self.news_max_pages)
            .field("news_request_timeout_secs", &self.news_request_timeout_secs)
            .field("news_inter_page_delay_ms", &self.news_inter_page_delay_ms)
            .field(
                "news_max_concurrent_queries",
                &self.news_max_concurrent_queries,
            )
            .field("news_max_retries", &self.news_max_retries)
            .field(
                "news_retry_backoff_base_ms",
                &self.news_retry_backoff_base_ms,
            )
            .field("scorer_url", &self.scorer_url)
            .field("scorer_batch_size", &self.scorer_batch_size)
            .field(
                "scorer_max_concurrent_batches",
                &self.scorer_max_concurrent_batches,
            )
            .field("scorer_entailment_label", &self.scorer_entailment_label)
            .field("scorer_timeout_secs", &self.scorer_timeout_secs)
            .finish()
    }
}
