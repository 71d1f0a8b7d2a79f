//! Database operations for the `articles` table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sentiflow_core::{Article, NewArticle};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            url: row.url,
            content: row.content,
            published_at: row.published_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert articles in one statement, skipping URLs that already exist.
///
/// Returns the number of rows actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_articles<'e, E>(executor: E, articles: &[NewArticle]) -> Result<u64, DbError>
where
    E: PgExecutor<'e>,
{
    if articles.is_empty() {
        return Ok(0);
    }

    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
    let contents: Vec<&str> = articles.iter().map(|a| a.content.as_str()).collect();
    let published: Vec<Option<DateTime<Utc>>> = articles.iter().map(|a| a.published_at).collect();

    let result = sqlx::query(
        "INSERT INTO articles (title, url, content, published_at) \
         SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::timestamptz[]) \
         ON CONFLICT (url) DO NOTHING",
    )
    .bind(&titles)
    .bind(&urls)
    .bind(&contents)
    .bind(&published)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// The subset of `urls` already present in `articles`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn existing_article_urls<'e, E>(
    executor: E,
    urls: &[String],
) -> Result<HashSet<String>, DbError>
where
    E: PgExecutor<'e>,
{
    if urls.is_empty() {
        return Ok(HashSet::new());
    }

    let found: Vec<String> = sqlx::query_scalar("SELECT url FROM articles WHERE url = ANY($1)")
        .bind(urls)
        .fetch_all(executor)
        .await?;
    Ok(found.into_iter().collect())
}

/// Fetch stored articles for the given URLs, ordered by URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn articles_by_urls<'e, E>(executor: E, urls: &[String]) -> Result<Vec<ArticleRow>, DbError>
where
    E: PgExecutor<'e>,
{
    if urls.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, ArticleRow>(
        "SELECT id, title, url, content, published_at, created_at \
         FROM articles \
         WHERE url = ANY($1) \
         ORDER BY url",
    )
    .bind(urls)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Total number of stored articles.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_articles<'e, E>(executor: E) -> Result<i64, DbError>
where
    E: PgExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(executor)
        .await?;
    Ok(count)
}
