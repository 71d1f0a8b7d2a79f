mod db;
mod run;
mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use db::DbCommands;

#[derive(Debug, Parser)]
#[command(name = "sentiflow")]
#[command(about = "Entity news sentiment pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Fetch news, match entity mentions and score sentiment
    Run {
        /// Plan the queries and exit without fetching or writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the news queries the next run would issue
    Queries,
    /// Show stored sentiment and recent pipeline runs
    Status {
        /// Show recent sentiment for one entity (by name)
        #[arg(long)]
        entity: Option<String>,
        /// Maximum number of rows per table
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("sentiflow: no command given; see --help");
        return Ok(());
    };

    let config = sentiflow_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = sentiflow_db::connect_pool(
        &config.database_url,
        sentiflow_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    tracing::debug!(env = %config.env, "connected to database");

    match command {
        Commands::Db { command } => db::run_db(&pool, &config, command).await,
        Commands::Run { dry_run } => run::run_sentiment_pipeline(&pool, &config, dry_run).await,
        Commands::Queries => run::print_planned_queries(&pool).await,
        Commands::Status { entity, limit } => {
            status::run_status(&pool, entity.as_deref(), limit).await
        }
    }
}

/// Attempt to mark a pipeline run as failed, logging any secondary error.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = sentiflow_db::fail_pipeline_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark pipeline run as failed"
        );
    }
}

#[cfg(test)]
mod tests;
