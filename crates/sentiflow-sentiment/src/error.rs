use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// `find` was called on a matcher that was never built.
    #[error("mention matcher has not been built")]
    MatcherNotBuilt,

    #[error("failed to build mention matcher: {0}")]
    MatcherBuild(String),

    /// The scoring backend failed for a mini-batch.
    #[error("scoring failed for batch {batch}: {message}")]
    Scoring { batch: usize, message: String },

    #[error("scoring backend returned {got} scores for {expected} pairs in batch {batch}")]
    ScoreCountMismatch {
        batch: usize,
        expected: usize,
        got: usize,
    },

    #[error("scoring backend returned invalid score {score} at position {index} of batch {batch}")]
    MalformedScore {
        batch: usize,
        index: usize,
        score: f32,
    },

    #[error("TEI predict error: {0}")]
    Tei(String),

    #[error("persistence error: {0}")]
    Store(#[source] BoxError),

    #[error("article fetch error: {0}")]
    Fetch(#[source] BoxError),
}

impl SentimentError {
    /// Wrap a persistence-layer error.
    pub fn store(err: impl Into<BoxError>) -> Self {
        SentimentError::Store(err.into())
    }

    /// Wrap a fetch-layer error.
    pub fn fetch(err: impl Into<BoxError>) -> Self {
        SentimentError::Fetch(err.into())
    }
}
