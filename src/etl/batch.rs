//! Batch generators: projections from the cleaned item list to one derived
//! entity list per target table, each with structural dedup.

use crate::domain::Record;
use crate::utils::error::{EtlError, Result};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Order-preserving dedup on the canonical record fingerprint. Running it
/// twice on its own output is a fixed point.
fn drop_repeated(rows: Vec<Record>, entity: &str) -> Vec<Record> {
    let before = rows.len();
    let mut seen = HashSet::new();
    let rows: Vec<Record> = rows
        .into_iter()
        .filter(|row| seen.insert(row.fingerprint()))
        .collect();
    if before > rows.len() {
        tracing::warn!("{} {} registries were repeated", before - rows.len(), entity);
    }
    rows
}

/// Projects one (seller_id, completed_sales) record per item.
#[derive(Debug, Clone, Default)]
pub struct SellersBatchGenerator;

impl SellersBatchGenerator {
    pub fn build(&self, items: &[Record]) -> Result<Vec<Record>> {
        let mut sellers = Vec::with_capacity(items.len());
        for item in items {
            let mut seller = Record::new();
            seller.insert("seller_id", json!(item.i64_field("seller_id")?));
            seller.insert("completed_sales", json!(item.i64_field("completed_sales")?));
            sellers.push(seller);
        }
        Ok(drop_repeated(sellers, "seller"))
    }
}

/// Fans out one (item_id, shipping_method) record per shipping tag. An item
/// carrying N tags yields N rows; the tag list is never empty after the
/// shipping transformation (zero tags arrive as `[null]`).
#[derive(Debug, Clone, Default)]
pub struct ShippingBatchGenerator;

impl ShippingBatchGenerator {
    pub fn build(&self, items: &[Record]) -> Result<Vec<Record>> {
        let mut shippings = Vec::new();
        for item in items {
            let item_id = item.str_field("id")?;
            let tags = item
                .get("shipping")
                .and_then(Value::as_array)
                .ok_or_else(|| EtlError::missing_field("shipping"))?;
            for tag in tags {
                let mut shipping = Record::new();
                shipping.insert("item_id", json!(item_id));
                shipping.insert("shipping_method", tag.clone());
                shippings.push(shipping);
            }
        }
        Ok(drop_repeated(shippings, "item_shipping"))
    }
}

/// Clones each cleaned record and strips the keys that are not `items`
/// columns, leaving the storable product row.
#[derive(Debug, Clone)]
pub struct ProductsBatchGenerator {
    drop_keys: Vec<String>,
}

impl ProductsBatchGenerator {
    pub fn new(drop_keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            drop_keys: drop_keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn build(&self, items: &[Record]) -> Result<Vec<Record>> {
        let products = items
            .iter()
            .map(|item| {
                let mut product = item.clone();
                for key in &self.drop_keys {
                    product.remove(key);
                }
                product
            })
            .collect();
        Ok(drop_repeated(products, "product"))
    }
}
