//! Record filtering: named predicates and their conjunction.

use crate::domain::Record;
use serde_json::Value;
use std::collections::HashSet;

/// A named predicate over one record. Filtering is purely functional over an
/// already-fetched batch; rejections are logged with the record identifier
/// and reason but never raise errors.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Passes records whose `condition` field is `"new"`.
    NotNewProduct,
    /// Rejects records whose id was already persisted today.
    ItemAlreadyStored {
        current_day_item_ids: HashSet<String>,
    },
    /// Rejects seller records matching a known (seller_id, completed_sales)
    /// pair exactly on both fields.
    SellerAlreadyStored {
        known_sellers: HashSet<(i64, i64)>,
    },
}

impl Condition {
    pub fn satisfies(&self, record: &Record) -> bool {
        match self {
            Condition::NotNewProduct => {
                if record.get("condition").and_then(Value::as_str) == Some("new") {
                    return true;
                }
                tracing::warn!(
                    "item {} is not new and will be filtered",
                    record.display_id()
                );
                false
            }
            Condition::ItemAlreadyStored {
                current_day_item_ids,
            } => match record.opt_str_field("id") {
                Some(id) if current_day_item_ids.contains(id) => {
                    tracing::warn!(
                        "item {id} has already been stored today and will be filtered"
                    );
                    false
                }
                _ => true,
            },
            Condition::SellerAlreadyStored { known_sellers } => {
                let pair = record
                    .get("seller_id")
                    .and_then(Value::as_i64)
                    .zip(record.get("completed_sales").and_then(Value::as_i64));
                match pair {
                    Some(key) if known_sellers.contains(&key) => {
                        tracing::warn!(
                            "seller {} is already stored with unchanged completed sales \
                             and will be filtered",
                            key.0
                        );
                        false
                    }
                    _ => true,
                }
            }
        }
    }
}

/// An ordered conjunction of conditions, short-circuiting on the first
/// failure.
#[derive(Debug, Clone)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn apply(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.satisfies(record))
    }

    /// Keeps only the records that satisfy every condition, preserving order.
    pub fn apply_to_all(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.apply(r)).collect()
    }
}
