use sentiflow_core::{Category, Entity};
use sqlx::PgPool;

use crate::DbError;

/// Counts of rows upserted by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub entities: usize,
}

/// Upsert categories and entities from config into the database.
///
/// Entity ids are derived from the name and category, so re-seeding updates
/// existing rows instead of duplicating them. All upserts run inside a single
/// transaction; if any operation fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(
    pool: &PgPool,
    categories: &[Category],
    entities: &[Entity],
) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for category in categories {
        sqlx::query(
            "INSERT INTO categories (id, name) \
             VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 updated_at = NOW()",
        )
        .bind(category.id)
        .bind(&category.name)
        .execute(&mut *tx)
        .await?;
        summary.categories += 1;
    }

    for entity in entities {
        sqlx::query(
            "INSERT INTO entities (id, name, category_id, description, image_url, keywords) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 category_id = EXCLUDED.category_id, \
                 description = EXCLUDED.description, \
                 image_url = EXCLUDED.image_url, \
                 keywords = EXCLUDED.keywords, \
                 updated_at = NOW()",
        )
        .bind(entity.id)
        .bind(&entity.name)
        .bind(entity.category_id)
        .bind(&entity.description)
        .bind(&entity.image_url)
        .bind(&entity.keywords)
        .execute(&mut *tx)
        .await?;
        summary.entities += 1;
    }

    tx.commit().await?;
    Ok(summary)
}
