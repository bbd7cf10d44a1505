//! Wires the three pipeline stages from live collaborator state.

use crate::api::MeliClient;
use crate::db::DbClient;
use crate::etl::batch::{ProductsBatchGenerator, SellersBatchGenerator, ShippingBatchGenerator};
use crate::etl::cleaner::DataCleaner;
use crate::etl::filter::{Condition, Filter};
use crate::etl::transformations::Transformation;
use crate::etl::{Extractor, Loader, Transformer};
use crate::metrics::MetricsRegistry;
use crate::utils::error::Result;
use std::sync::Arc;

/// Builds the Extractor, Transformer and Loader for one run: fetches the
/// BRL→USD conversion factor and loads the two already-stored lookups used
/// by the pre-filters.
pub async fn etl_factory(
    client: MeliClient,
    db: DbClient,
    metrics: Arc<MetricsRegistry>,
) -> Result<(Extractor, Transformer, Loader)> {
    let currency_factor = client.currency_rate("BRL", "USD").await?;
    let current_day_item_ids = db.current_day_item_ids().await?;
    let known_sellers = db.sellers_on_file().await?;

    let extractor = Extractor::new(
        client,
        Some(Filter::new(vec![
            Condition::ItemAlreadyStored {
                current_day_item_ids,
            },
            Condition::NotNewProduct,
        ])),
    );

    let transformer = Transformer::new(
        vec![
            Transformation::HandleNoWarrantyString {
                no_warranty_strings: vec!["Sem garantia".to_string()],
            },
            Transformation::PriceConverter { currency_factor },
            Transformation::InsertSellerId,
            Transformation::InsertSellerCompletedSales,
            Transformation::ShippingMethods,
        ],
        DataCleaner::with_relevant_keys([
            "id",
            "title",
            "sold_quantity",
            "shipping",
            "price",
            "warranty",
            "seller_id",
            "completed_sales",
        ])?,
        SellersBatchGenerator,
        ShippingBatchGenerator,
        // `shipping` feeds the shipping generator only and `completed_sales`
        // is not an items column, so neither belongs on the product row.
        ProductsBatchGenerator::new(["shipping", "completed_sales"]),
        Some(Filter::new(vec![Condition::SellerAlreadyStored {
            known_sellers,
        }])),
    );

    let loader = Loader::new(db, metrics);

    Ok((extractor, transformer, loader))
}
