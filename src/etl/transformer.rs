//! Transformation stage: normalization pipeline, cleaning and batch
//! generation.

use crate::domain::Record;
use crate::etl::batch::{ProductsBatchGenerator, SellersBatchGenerator, ShippingBatchGenerator};
use crate::etl::cleaner::DataCleaner;
use crate::etl::filter::Filter;
use crate::etl::transformations::Transformation;
use crate::utils::error::Result;

/// The three derived entity batches, ready to be loaded.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub products: Vec<Record>,
    pub shippings: Vec<Record>,
    pub sellers: Vec<Record>,
}

pub struct Transformer {
    transformations: Vec<Transformation>,
    cleaner: DataCleaner,
    sellers_generator: SellersBatchGenerator,
    shipping_generator: ShippingBatchGenerator,
    products_generator: ProductsBatchGenerator,
    sellers_filter: Option<Filter>,
}

impl Transformer {
    pub fn new(
        transformations: Vec<Transformation>,
        cleaner: DataCleaner,
        sellers_generator: SellersBatchGenerator,
        shipping_generator: ShippingBatchGenerator,
        products_generator: ProductsBatchGenerator,
        sellers_filter: Option<Filter>,
    ) -> Self {
        Self {
            transformations,
            cleaner,
            sellers_generator,
            shipping_generator,
            products_generator,
            sellers_filter,
        }
    }

    /// Runs the ordered transformation pipeline and the cleaner over each
    /// record, then derives the three entity batches from the cleaned list.
    /// The generators are independent projections; only the seller batch gets
    /// the secondary already-stored filter.
    pub fn transform(&self, records: Vec<Record>) -> Result<TransformOutput> {
        let mut cleaned = Vec::with_capacity(records.len());
        for record in records {
            let mut record = record;
            for transformation in &self.transformations {
                record = transformation.apply(record)?;
            }
            cleaned.push(self.cleaner.clean(record));
        }

        let mut sellers = self.sellers_generator.build(&cleaned)?;
        if let Some(filter) = &self.sellers_filter {
            let before = sellers.len();
            sellers = filter.apply_to_all(sellers);
            if before > sellers.len() {
                tracing::warn!("{} seller registries were filtered", before - sellers.len());
            }
        }
        let shippings = self.shipping_generator.build(&cleaned)?;
        let products = self.products_generator.build(&cleaned)?;

        Ok(TransformOutput {
            products,
            shippings,
            sellers,
        })
    }
}
