//! Database maintenance command handlers.

use clap::Subcommand;
use sentiflow_core::AppConfig;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert categories and entities from the entities YAML file
    Seed,
}

pub(crate) async fn run_db(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            sentiflow_db::ping(pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = sentiflow_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed => run_seed(pool, config).await?,
    }
    Ok(())
}

/// Load the entities file, validate it and upsert its contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// the upsert transaction fails.
async fn run_seed(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let file = sentiflow_core::load_entities(&config.entities_path)?;
    let categories = file.categories();
    let entities = file.resolve_entities()?;

    let summary = sentiflow_db::seed_catalog(pool, &categories, &entities).await?;
    tracing::info!(
        path = %config.entities_path.display(),
        categories = summary.categories,
        entities = summary.entities,
        "seeded entity catalog"
    );
    println!(
        "seeded {} categories and {} entities",
        summary.categories, summary.entities
    );
    Ok(())
}
