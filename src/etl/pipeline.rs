//! One Extract → Transform → Load pass.

use crate::etl::{Extractor, Loader, Transformer};
use crate::metrics::{stage, MetricsRegistry};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Instant;

pub struct EtlPipeline {
    extractor: Extractor,
    transformer: Transformer,
    loader: Loader,
    metrics: Arc<MetricsRegistry>,
}

impl EtlPipeline {
    pub fn new(
        extractor: Extractor,
        transformer: Transformer,
        loader: Loader,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            extractor,
            transformer,
            loader,
            metrics,
        }
    }

    /// Runs the three stages sequentially. The extract and transform stage
    /// durations are recorded here; the load sample is recorded inside the
    /// Loader around the entity inserts, so it lands in the same flush.
    pub async fn run(&self, query: &str, exclude_seller_id: i64, max_items: usize) -> Result<()> {
        tracing::info!(
            query,
            exclude_seller_id,
            max_items,
            "getting raw data from the search API"
        );
        let started = Instant::now();
        let items = self
            .extractor
            .search(query, exclude_seller_id, max_items)
            .await?;
        self.metrics.record_process(stage::EXTRACT, started.elapsed());
        tracing::info!("extracted {} records", items.len());

        tracing::info!("applying transformations and preparing data to be stored");
        let started = Instant::now();
        let output = self.transformer.transform(items)?;
        self.metrics
            .record_process(stage::TRANSFORM, started.elapsed());

        tracing::info!("loading new data into the database");
        self.loader
            .load(&output.products, &output.sellers, &output.shippings)
            .await
    }
}
