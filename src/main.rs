use clap::Parser;
use meli_etl::db::{create_schema, DbClient};
use meli_etl::utils::{logger, validation::Validate};
use meli_etl::{api, etl_factory, CliConfig, EtlPipeline, MeliClient, MetricsRegistry, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::info!("Starting meli-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("configuration validation failed: {}", e);
        std::process::exit(2);
    }

    if let Err(e) = run(config).await {
        tracing::error!("ETL run failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: CliConfig) -> Result<()> {
    let started = Instant::now();

    let options = SqliteConnectOptions::new()
        .filename(&config.database)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    create_schema(&pool, config.new_db).await?;

    let metrics = Arc::new(MetricsRegistry::new());
    let client = MeliClient::new(api::DEFAULT_BASE_URL, &config.site, metrics.clone());
    let db = DbClient::new(pool, metrics.clone());

    let (extractor, transformer, loader) = etl_factory(client, db, metrics.clone()).await?;
    let pipeline = EtlPipeline::new(extractor, transformer, loader, metrics);

    pipeline
        .run(&config.query, config.exclude_seller_id, config.max_items)
        .await?;

    tracing::info!(
        "Finished! Time: {:.2} seconds",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
