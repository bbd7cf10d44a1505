//! Load stage: entity inserts plus the end-of-run metrics flush.

use crate::db::DbClient;
use crate::domain::Record;
use crate::metrics::{stage, MetricsRegistry};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Instant;

pub struct Loader {
    db: DbClient,
    metrics: Arc<MetricsRegistry>,
}

impl Loader {
    pub fn new(db: DbClient, metrics: Arc<MetricsRegistry>) -> Self {
        Self { db, metrics }
    }

    /// Persists the three entity batches (items, then shipping, then
    /// sellers), then flushes the accumulated timing samples. Empty batches
    /// are skipped with a warning; they are not an error.
    pub async fn load(
        &self,
        products: &[Record],
        sellers: &[Record],
        shippings: &[Record],
    ) -> Result<()> {
        let started = Instant::now();
        self.insert_products(products).await?;
        self.insert_item_shipping(shippings).await?;
        self.insert_sellers(sellers).await?;
        self.metrics.record_process(stage::LOAD, started.elapsed());

        self.flush_metrics().await
    }

    async fn insert_products(&self, products: &[Record]) -> Result<()> {
        if products.is_empty() {
            tracing::warn!("no new product data retrieved");
            return Ok(());
        }
        tracing::info!("inserting {} products", products.len());
        self.db.insert_items(products).await
    }

    async fn insert_item_shipping(&self, shippings: &[Record]) -> Result<()> {
        if shippings.is_empty() {
            tracing::warn!("no new item_shipping data retrieved");
            return Ok(());
        }
        tracing::info!(
            "inserting {} items & shipping methods",
            shippings.len()
        );
        self.db.insert_item_shipping(shippings).await
    }

    async fn insert_sellers(&self, sellers: &[Record]) -> Result<()> {
        if sellers.is_empty() {
            tracing::warn!("no new sellers data retrieved");
            return Ok(());
        }
        tracing::info!("inserting {} sellers", sellers.len());
        self.db.insert_sellers(sellers).await
    }

    async fn flush_metrics(&self) -> Result<()> {
        let requests = self.metrics.request_samples();
        tracing::info!("inserting {} registries of request metrics", requests.len());
        self.db.insert_request_metrics(&requests).await?;

        let inserts = self.metrics.insert_samples();
        tracing::info!("inserting {} registries of database metrics", inserts.len());
        self.db.insert_database_metrics(&inserts).await?;

        let processes = self.metrics.process_samples();
        tracing::info!(
            "inserting {} registries of process metrics",
            processes.len()
        );
        self.db.insert_process_metrics(&processes).await?;

        Ok(())
    }
}
