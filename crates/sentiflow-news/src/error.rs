use thiserror::Error;

/// Errors returned by the NewsAPI client.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 or 5xx. Worth retrying after a back-off.
    #[error("NewsAPI transient failure (HTTP {status}): {message}")]
    Transient { status: u16, message: String },

    /// NewsAPI returned `"status": "error"` with a code and message.
    #[error("NewsAPI error {code}: {message}")]
    ApiError { code: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no NewsAPI keys configured")]
    NoApiKeys,

    #[error("invalid NewsAPI base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl NewsError {
    /// NewsAPI's code for requests past the plan's result window.
    pub const MAXIMUM_RESULTS_REACHED: &'static str = "maximumResultsReached";

    /// `true` when the API reports that no further pages can be served.
    #[must_use]
    pub fn is_result_limit(&self) -> bool {
        matches!(self, NewsError::ApiError { code, .. } if code == Self::MAXIMUM_RESULTS_REACHED)
    }
}
