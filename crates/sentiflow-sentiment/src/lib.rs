//! Entity matching and zero-shot sentiment scoring for news articles.
//!
//! Builds tiered news queries from the entity catalog, deduplicates fetched
//! articles by URL, finds entity mentions with an Aho-Corasick automaton and
//! scores every (article, entity) pair with an NLI entailment model served by
//! TEI. Persistence and fetching are injected via [`SentimentStore`] and
//! [`ArticleSource`].

pub mod dedup;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod query_tiers;
pub mod scorer;
pub mod tei;

pub use dedup::deduplicate_articles;
pub use error::SentimentError;
pub use matcher::MentionMatcher;
pub use pipeline::{
    plan_queries, run_pipeline, ArticleSource, Catalog, PipelineOutcome, RunSummary,
    SentimentStore, SkipReason,
};
pub use query_tiers::build_query_specs;
pub use scorer::{
    hypothesis, BulkScorer, EntailmentPair, EntailmentScorer, MentionedEntity, ScorerConfig,
    ScoringJob, DEFAULT_BATCH_SIZE,
};
pub use tei::{TeiEntailmentClient, DEFAULT_ENTAILMENT_LABEL};
