//! Database operations for the `article_sentiments` table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sentiflow_core::SentimentRecord;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::DbError;

/// Decimal places kept by the `NUMERIC(6,4)` score columns.
const SCORE_SCALE: u32 = 4;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One sentiment row joined with its article and entity, for reporting.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentSentimentRow {
    pub entity_name: String,
    pub article_title: String,
    pub article_url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub positive_score: Decimal,
    pub neutral_score: Decimal,
    pub negative_score: Decimal,
    pub sentiment: String,
    pub created_at: DateTime<Utc>,
}

/// Per-entity label counts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntitySentimentSummaryRow {
    pub entity_id: Uuid,
    pub entity_name: String,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
    pub total: i64,
    pub last_scored_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Convert a probability to a 4-decimal [`Decimal`].
///
/// # Errors
///
/// Returns [`DbError::InvalidScore`] for non-finite or negative values, or
/// values that do not fit `NUMERIC(6,4)`.
pub fn score_to_decimal(score: f64) -> Result<Decimal, DbError> {
    if !score.is_finite() || score < 0.0 || score >= 100.0 {
        return Err(DbError::InvalidScore(score));
    }
    Decimal::from_f64(score)
        .map(|d| d.round_dp(SCORE_SCALE))
        .ok_or(DbError::InvalidScore(score))
}

/// Insert sentiment records in one statement, skipping existing
/// (article, entity) pairs.
///
/// Returns the number of rows actually inserted.
///
/// # Errors
///
/// Returns [`DbError::InvalidScore`] if a score cannot be stored, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_sentiments<'e, E>(
    executor: E,
    records: &[SentimentRecord],
) -> Result<u64, DbError>
where
    E: PgExecutor<'e>,
{
    if records.is_empty() {
        return Ok(0);
    }

    let mut article_ids = Vec::with_capacity(records.len());
    let mut entity_ids = Vec::with_capacity(records.len());
    let mut positive = Vec::with_capacity(records.len());
    let mut neutral = Vec::with_capacity(records.len());
    let mut negative = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for record in records {
        article_ids.push(record.article_id);
        entity_ids.push(record.entity_id);
        positive.push(score_to_decimal(record.positive_score)?);
        neutral.push(score_to_decimal(record.neutral_score)?);
        negative.push(score_to_decimal(record.negative_score)?);
        labels.push(record.sentiment.as_str());
    }

    let result = sqlx::query(
        "INSERT INTO article_sentiments \
             (article_id, entity_id, positive_score, neutral_score, negative_score, sentiment) \
         SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::numeric[], $4::numeric[], \
                              $5::numeric[], $6::text[]) \
         ON CONFLICT (article_id, entity_id) DO NOTHING",
    )
    .bind(&article_ids)
    .bind(&entity_ids)
    .bind(&positive)
    .bind(&neutral)
    .bind(&negative)
    .bind(&labels)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Ids of entities with at least one stored sentiment record.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn entity_ids_with_sentiment<'e, E>(executor: E) -> Result<HashSet<Uuid>, DbError>
where
    E: PgExecutor<'e>,
{
    let ids: Vec<Uuid> = sqlx::query_scalar("SELECT DISTINCT entity_id FROM article_sentiments")
        .fetch_all(executor)
        .await?;
    Ok(ids.into_iter().collect())
}

/// Most recent sentiment rows, optionally for one entity.
///
/// Ordered by `created_at DESC` then `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_sentiments<'e, E>(
    executor: E,
    entity_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<RecentSentimentRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, RecentSentimentRow>(
        "SELECT e.name AS entity_name, a.title AS article_title, a.url AS article_url, \
                a.published_at, s.positive_score, s.neutral_score, s.negative_score, \
                s.sentiment, s.created_at \
         FROM article_sentiments s \
         JOIN articles a ON a.id = s.article_id \
         JOIN entities e ON e.id = s.entity_id \
         WHERE ($1::uuid IS NULL OR s.entity_id = $1) \
         ORDER BY s.created_at DESC, s.id DESC \
         LIMIT $2",
    )
    .bind(entity_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Label counts per entity, for entities with any sentiment, most active first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn entity_sentiment_summary<'e, E>(
    executor: E,
    limit: i64,
) -> Result<Vec<EntitySentimentSummaryRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, EntitySentimentSummaryRow>(
        "SELECT e.id AS entity_id, e.name AS entity_name, \
                COUNT(*) FILTER (WHERE s.sentiment = 'positive') AS positive, \
                COUNT(*) FILTER (WHERE s.sentiment = 'neutral') AS neutral, \
                COUNT(*) FILTER (WHERE s.sentiment = 'negative') AS negative, \
                COUNT(*) AS total, \
                MAX(s.created_at) AS last_scored_at \
         FROM article_sentiments s \
         JOIN entities e ON e.id = s.entity_id \
         GROUP BY e.id, e.name \
         ORDER BY total DESC, e.name \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}
