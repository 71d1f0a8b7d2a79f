//! Database reads for `categories` and `entities`.

use chrono::{DateTime, Utc};
use sentiflow_core::{Category, Entity};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
        }
    }
}

/// A row from the `entities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EntityRow> for Entity {
    fn from(row: EntityRow) -> Self {
        Entity {
            id: row.id,
            name: row.name,
            category_id: row.category_id,
            description: row.description,
            image_url: row.image_url,
            keywords: row.keywords,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// List all categories ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories<'e, E>(executor: E) -> Result<Vec<CategoryRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY id")
        .fetch_all(executor)
        .await?;
    Ok(rows)
}

/// List all entities ordered by category, then name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entities<'e, E>(executor: E) -> Result<Vec<EntityRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, EntityRow>(
        "SELECT id, name, category_id, description, image_url, keywords, created_at, updated_at \
         FROM entities \
         ORDER BY category_id, name, id",
    )
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Look up an entity by display name, case-insensitively.
///
/// When the name exists in several categories the lowest category id wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_entity_by_name<'e, E>(executor: E, name: &str) -> Result<Option<EntityRow>, DbError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, EntityRow>(
        "SELECT id, name, category_id, description, image_url, keywords, created_at, updated_at \
         FROM entities \
         WHERE lower(name) = lower($1) \
         ORDER BY category_id \
         LIMIT 1",
    )
    .bind(name.trim())
    .fetch_optional(executor)
    .await?;
    Ok(row)
}
