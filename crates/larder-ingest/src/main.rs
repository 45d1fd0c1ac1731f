//! Larder Ingest - Open Food Facts catalog import

use anyhow::Result;
use larder_common::logging::{init_logging, LogConfig, LogLevel};
use larder_ingest::{db, Config, ImportError, ImportPipeline};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Also loads .env, so LOG_* set there apply below
    let config = Config::load()?;

    let log_config = LogConfig::builder()
        .level(LogLevel::Info)
        .log_file_prefix("larder-ingest")
        .filter_directives("sqlx=warn")
        .build()
        .merge_env()?;
    let _log_guard = init_logging(&log_config)?;

    if let Err(err) = run(config).await {
        error!(error = %err, "Import aborted");
        if matches!(err, ImportError::Http(_)) {
            error!("Open Food Facts may be rate limiting or down; try the import again later");
        }
        return Err(err.into());
    }

    Ok(())
}

async fn run(config: Config) -> larder_ingest::Result<()> {
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let pipeline = ImportPipeline::new(config.import, pool)?;
    let stats = pipeline.run().await?;

    info!(
        imported = stats.products_imported,
        dropped = stats.records_dropped,
        "Open Food Facts import finished"
    );

    Ok(())
}
