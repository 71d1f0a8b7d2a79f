//! Read-only `status` command handler.

/// Show stored sentiment, either per entity or for one named entity, plus
/// the most recent pipeline runs.
///
/// # Errors
///
/// Returns an error if the entity filter does not match a known entity or a
/// database query fails.
pub(crate) async fn run_status(
    pool: &sqlx::PgPool,
    entity_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let limit = limit.max(1);

    match entity_filter {
        Some(name) => print_entity_sentiment(pool, name, limit).await?,
        None => print_summary(pool, limit).await?,
    }

    println!();
    print_runs(pool, limit).await
}

async fn print_entity_sentiment(pool: &sqlx::PgPool, name: &str, limit: i64) -> anyhow::Result<()> {
    let entity = sentiflow_db::get_entity_by_name(pool, name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("entity '{name}' not found"))?;

    let rows = sentiflow_db::list_recent_sentiments(pool, Some(entity.id), limit).await?;
    if rows.is_empty() {
        println!("no sentiment found for '{}'; run `run` first", entity.name);
        return Ok(());
    }

    println!(
        "{:<18}{:<10}{:<10}{:<10}{:<10}TITLE",
        "PUBLISHED", "LABEL", "POS", "NEU", "NEG"
    );
    for row in &rows {
        let published = row.published_at.map_or_else(
            || "-".to_string(),
            |d| d.format("%Y-%m-%d %H:%M").to_string(),
        );
        println!(
            "{:<18}{:<10}{:<10}{:<10}{:<10}{}",
            published,
            row.sentiment,
            row.positive_score,
            row.neutral_score,
            row.negative_score,
            truncate(&row.article_title, 80)
        );
    }
    Ok(())
}

async fn print_summary(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let articles = sentiflow_db::count_articles(pool).await?;
    let rows = sentiflow_db::entity_sentiment_summary(pool, limit).await?;

    println!("stored articles: {articles}");
    if rows.is_empty() {
        println!("no sentiment records yet");
        return Ok(());
    }

    println!(
        "{:<28}{:<8}{:<8}{:<8}{:<8}LAST SCORED",
        "ENTITY", "TOTAL", "POS", "NEU", "NEG"
    );
    for row in &rows {
        let last = row.last_scored_at.map_or_else(
            || "-".to_string(),
            |d| d.format("%Y-%m-%d %H:%M").to_string(),
        );
        println!(
            "{:<28}{:<8}{:<8}{:<8}{:<8}{}",
            row.entity_name, row.total, row.positive, row.neutral, row.negative, last
        );
    }
    Ok(())
}

async fn print_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = sentiflow_db::list_pipeline_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no pipeline runs recorded");
        return Ok(());
    }

    println!("{:<8}{:<12}{:<18}{:<10}MESSAGE", "RUN", "STATUS", "STARTED", "RECORDS");
    for run in &runs {
        let started = run.started_at.map_or_else(
            || "-".to_string(),
            |d| d.format("%Y-%m-%d %H:%M").to_string(),
        );
        println!(
            "{:<8}{:<12}{:<18}{:<10}{}",
            run.id,
            run.status,
            started,
            run.records_processed,
            run.error_message.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Shorten `s` to at most `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
