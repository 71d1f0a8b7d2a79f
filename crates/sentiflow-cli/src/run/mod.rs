//! The `run` and `queries` command handlers.
//!
//! A run's article and sentiment writes share one transaction that is
//! committed only when the whole pipeline succeeds. The `pipeline_runs` row
//! is written through the pool, outside that transaction, so a failed run
//! is still recorded after its writes are rolled back.

mod adapters;

use chrono::Utc;
use sentiflow_core::{AppConfig, QuerySpec};
use sentiflow_news::{FetchOptions, NewsClient};
use sentiflow_sentiment::{
    plan_queries, run_pipeline, BulkScorer, PipelineOutcome, RunSummary, ScorerConfig,
    TeiEntailmentClient,
};

use crate::fail_run_best_effort;

use adapters::{NewsSource, PgStore};

/// Run one full pipeline cycle and record it in `pipeline_runs`.
///
/// With `dry_run` the planned queries are printed and nothing is fetched,
/// scored or written.
///
/// # Errors
///
/// Returns an error if a client cannot be built, the run row cannot be
/// created, or any pipeline stage fails. Pipeline failures roll back the
/// run's writes and mark the run `failed`.
pub(crate) async fn run_sentiment_pipeline(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    dry_run: bool,
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();

    if dry_run {
        let specs = plan(pool).await?;
        let entities: usize = specs.iter().map(|s| s.entity_ids.len()).sum();
        println!(
            "dry-run: would issue {} queries covering {} entities",
            specs.len(),
            entities
        );
        return Ok(());
    }

    let news = build_news_client(config)?;
    let scorer = build_scorer(config)?;

    let run = sentiflow_db::create_pipeline_run(pool, "cli").await?;
    if let Err(e) = sentiflow_db::start_pipeline_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }
    tracing::info!(run_id = run.id, public_id = %run.public_id, "pipeline run started");

    let outcome = match execute(pool, &news, &scorer, today).await {
        Ok(outcome) => outcome,
        Err(e) => {
            fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
            return Err(e);
        }
    };

    let recorded = match &outcome {
        PipelineOutcome::NothingToDo { reason } => {
            sentiflow_db::skip_pipeline_run(pool, run.id, &reason.to_string()).await
        }
        PipelineOutcome::Completed(summary) => {
            let records = i32::try_from(summary.records_inserted).unwrap_or(i32::MAX);
            sentiflow_db::complete_pipeline_run(pool, run.id, records).await
        }
    };
    if let Err(err) = recorded {
        fail_run_best_effort(pool, run.id, format!("{err:#}")).await;
        return Err(err.into());
    }

    match &outcome {
        PipelineOutcome::NothingToDo { reason } => {
            println!("pipeline run {}: nothing to do ({reason})", run.public_id);
        }
        PipelineOutcome::Completed(summary) => print_summary(run.public_id, summary),
    }
    tracing::debug!(outcome = %serde_json::to_string(&outcome)?, "pipeline outcome");
    Ok(())
}

/// Print the queries the next run would issue, one per line.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub(crate) async fn print_planned_queries(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let specs = plan(pool).await?;
    if specs.is_empty() {
        println!("no queries planned; run `db seed` to load the entity catalog");
        return Ok(());
    }

    println!("{:<28}{:<10}{:<24}QUERY", "GROUP", "ENTITIES", "WINDOW");
    for spec in &specs {
        let window = format!("{} .. {}", spec.from, spec.to);
        println!(
            "{:<28}{:<10}{:<24}{}",
            spec.label(),
            spec.entity_ids.len(),
            window,
            spec.query()
        );
    }
    Ok(())
}

/// Plan queries inside a read-only transaction that is always rolled back.
async fn plan(pool: &sqlx::PgPool) -> anyhow::Result<Vec<QuerySpec>> {
    let mut store = PgStore::begin(pool).await?;
    let specs = plan_queries(&mut store, Utc::now().date_naive()).await;
    store.rollback().await?;
    Ok(specs?)
}

/// Run the pipeline inside one transaction, committing only on success.
async fn execute(
    pool: &sqlx::PgPool,
    news: &NewsClient,
    scorer: &BulkScorer<TeiEntailmentClient>,
    today: chrono::NaiveDate,
) -> anyhow::Result<PipelineOutcome> {
    let mut store = PgStore::begin(pool).await?;
    let source = NewsSource::new(news);

    match run_pipeline(&mut store, &source, scorer, today).await {
        Ok(outcome) => {
            store.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            if let Err(rollback_err) = store.rollback().await {
                tracing::warn!(error = %rollback_err, "failed to roll back pipeline transaction");
            }
            Err(e.into())
        }
    }
}

fn build_news_client(config: &AppConfig) -> anyhow::Result<NewsClient> {
    let options = FetchOptions {
        language: config.news_language.clone(),
        page_size: config.news_page_size,
        max_pages: config.news_max_pages,
        inter_page_delay_ms: config.news_inter_page_delay_ms,
        max_concurrent_queries: config.news_max_concurrent_queries,
        max_retries: config.news_max_retries,
        retry_backoff_base_ms: config.news_retry_backoff_base_ms,
    };
    NewsClient::with_base_url(
        &config.news_api_keys,
        config.news_request_timeout_secs,
        &config.news_api_base_url,
        options,
    )
    .map_err(|e| anyhow::anyhow!("failed to build news client: {e}"))
}

fn build_scorer(config: &AppConfig) -> anyhow::Result<BulkScorer<TeiEntailmentClient>> {
    let backend = TeiEntailmentClient::new(
        &config.scorer_url,
        &config.scorer_entailment_label,
        config.scorer_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build scorer client: {e}"))?;

    Ok(BulkScorer::new(
        backend,
        ScorerConfig {
            batch_size: config.scorer_batch_size,
            max_concurrent_batches: config.scorer_max_concurrent_batches,
        },
    ))
}

fn print_summary(public_id: sqlx::types::Uuid, summary: &RunSummary) {
    println!(
        "pipeline run {public_id} complete: {} queries, {} fetched, {} unique, \
         {} new articles ({} inserted), {} matched, {} sentiment records ({} inserted)",
        summary.queries,
        summary.fetched,
        summary.unique,
        summary.new_articles,
        summary.articles_inserted,
        summary.matched_articles,
        summary.records,
        summary.records_inserted,
    );
}
