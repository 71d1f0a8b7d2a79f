//! Sentiment pipeline orchestration.
//!
//! The pipeline owns no I/O. Persistence, article fetching and model
//! inference are injected through [`SentimentStore`], [`ArticleSource`] and
//! [`EntailmentScorer`]; the caller owns any transaction around the store.

use std::collections::HashSet;
use std::future::Future;

use chrono::NaiveDate;
use sentiflow_core::{
    Article, Category, Entity, EntityId, NewArticle, QuerySpec, RawArticle, SentimentRecord,
};
use serde::Serialize;

use crate::dedup::deduplicate_articles;
use crate::error::SentimentError;
use crate::matcher::MentionMatcher;
use crate::query_tiers::build_query_specs;
use crate::scorer::{BulkScorer, EntailmentScorer, MentionedEntity, ScoringJob};

/// Categories and entities as currently persisted.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub entities: Vec<Entity>,
}

/// Read and write access to pipeline state.
///
/// Writes must be idempotent: `persist_articles` ignores URL conflicts and
/// `persist_sentiment` ignores (article, entity) conflicts.
pub trait SentimentStore: Send {
    fn entity_catalog(&mut self) -> impl Future<Output = Result<Catalog, SentimentError>> + Send;

    /// Entities that already have at least one stored sentiment record.
    fn entity_ids_with_prior_sentiment(
        &mut self,
    ) -> impl Future<Output = Result<HashSet<EntityId>, SentimentError>> + Send;

    /// The subset of `urls` already stored as articles.
    fn existing_article_urls(
        &mut self,
        urls: &[String],
    ) -> impl Future<Output = Result<HashSet<String>, SentimentError>> + Send;

    /// Insert articles, returning the number of rows actually inserted.
    fn persist_articles(
        &mut self,
        articles: &[NewArticle],
    ) -> impl Future<Output = Result<u64, SentimentError>> + Send;

    fn articles_by_urls(
        &mut self,
        urls: &[String],
    ) -> impl Future<Output = Result<Vec<Article>, SentimentError>> + Send;

    /// Insert sentiment records, returning the number of rows actually inserted.
    fn persist_sentiment(
        &mut self,
        records: &[SentimentRecord],
    ) -> impl Future<Output = Result<u64, SentimentError>> + Send;
}

/// Fetches raw articles for a set of queries.
pub trait ArticleSource: Sync {
    fn fetch(
        &self,
        specs: &[QuerySpec],
    ) -> impl Future<Output = Result<Vec<RawArticle>, SentimentError>> + Send;
}

/// Why a run stopped early without doing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyCatalog,
    NoQueries,
    NoNewArticles,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::EmptyCatalog => "entity catalog is empty",
            SkipReason::NoQueries => "no usable queries",
            SkipReason::NoNewArticles => "no new articles",
        };
        f.write_str(s)
    }
}

/// Counters for one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub queries: usize,
    pub fetched: usize,
    pub unique: usize,
    pub new_articles: usize,
    pub articles_inserted: u64,
    pub matched_articles: usize,
    pub records: usize,
    pub records_inserted: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    NothingToDo { reason: SkipReason },
    Completed(RunSummary),
}

/// Load the catalog and build this run's queries without fetching.
///
/// # Errors
///
/// Returns [`SentimentError`] if the store fails.
pub async fn plan_queries<St>(
    store: &mut St,
    today: NaiveDate,
) -> Result<Vec<QuerySpec>, SentimentError>
where
    St: SentimentStore,
{
    let catalog = store.entity_catalog().await?;
    if catalog.entities.is_empty() {
        return Ok(Vec::new());
    }
    let prior = store.entity_ids_with_prior_sentiment().await?;
    Ok(build_query_specs(
        &catalog.entities,
        &catalog.categories,
        &prior,
        today,
    ))
}

/// Run one full fetch, match and score cycle.
///
/// 1. Load the catalog and the entities with prior sentiment.
/// 2. Build tiered queries.
/// 3. Fetch, deduplicate by URL and drop already-stored URLs.
/// 4. Persist new articles and read them back to obtain ids.
/// 5. Match entity mentions in every new article.
/// 6. Score all (article, entity) pairs in one bulk call and persist them.
///
/// An empty catalog, no usable queries or no new articles end the run with
/// [`PipelineOutcome::NothingToDo`].
///
/// # Errors
///
/// Any store, fetch, matcher or scoring failure aborts the run. Writes
/// already issued are the caller's to roll back.
pub async fn run_pipeline<St, Src, Sc>(
    store: &mut St,
    source: &Src,
    scorer: &BulkScorer<Sc>,
    today: NaiveDate,
) -> Result<PipelineOutcome, SentimentError>
where
    St: SentimentStore,
    Src: ArticleSource,
    Sc: EntailmentScorer,
{
    let catalog = store.entity_catalog().await?;
    if catalog.entities.is_empty() {
        tracing::info!("entity catalog is empty; nothing to do");
        return Ok(nothing(SkipReason::EmptyCatalog));
    }

    let prior = store.entity_ids_with_prior_sentiment().await?;
    let specs = build_query_specs(&catalog.entities, &catalog.categories, &prior, today);
    if specs.is_empty() {
        return Ok(nothing(SkipReason::NoQueries));
    }

    let raw = source.fetch(&specs).await?;
    let fetched = raw.len();
    let unique = deduplicate_articles(raw);

    let candidate_urls: Vec<String> = unique.keys().cloned().collect();
    let existing = store.existing_article_urls(&candidate_urls).await?;
    let new_articles: Vec<NewArticle> = unique
        .iter()
        .filter(|(url, _)| !existing.contains(*url))
        .filter_map(|(_, raw)| NewArticle::from_raw(raw))
        .collect();

    tracing::info!(
        fetched,
        unique = unique.len(),
        already_stored = existing.len(),
        new = new_articles.len(),
        "article intake"
    );

    if new_articles.is_empty() {
        return Ok(nothing(SkipReason::NoNewArticles));
    }

    let articles_inserted = store.persist_articles(&new_articles).await?;
    let new_urls: Vec<String> = new_articles.iter().map(|a| a.url.clone()).collect();
    let mut articles = store.articles_by_urls(&new_urls).await?;
    articles.sort_by(|a, b| a.url.cmp(&b.url));

    let matcher = MentionMatcher::build(&catalog.entities)?;
    let jobs = build_jobs(&matcher, &articles)?;
    let matched_articles = jobs.len();
    tracing::info!(
        articles = articles.len(),
        matched = matched_articles,
        "matched entity mentions"
    );

    let records = scorer.score_jobs(&jobs).await?;
    let records_inserted = store.persist_sentiment(&records).await?;

    let summary = RunSummary {
        queries: specs.len(),
        fetched,
        unique: unique.len(),
        new_articles: new_articles.len(),
        articles_inserted,
        matched_articles,
        records: records.len(),
        records_inserted,
    };
    tracing::info!(?summary, "pipeline run complete");
    Ok(PipelineOutcome::Completed(summary))
}

fn nothing(reason: SkipReason) -> PipelineOutcome {
    tracing::info!(%reason, "pipeline run skipped");
    PipelineOutcome::NothingToDo { reason }
}

/// One job per article with at least one mention. Entities within a job are
/// ordered by name, then id.
fn build_jobs(
    matcher: &MentionMatcher,
    articles: &[Article],
) -> Result<Vec<ScoringJob>, SentimentError> {
    let mut jobs = Vec::new();
    for article in articles {
        let text = article.combined_text();
        let found = matcher.find(&text)?;
        if found.is_empty() {
            continue;
        }

        let mut entities: Vec<MentionedEntity> = found
            .into_iter()
            .filter_map(|id| {
                matcher.entity(&id).map(|e| MentionedEntity {
                    id,
                    name: e.name.clone(),
                })
            })
            .collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        jobs.push(ScoringJob {
            article_id: article.id,
            text,
            entities,
        });
    }
    Ok(jobs)
}
