//! Normalization steps applied in sequence to each raw record.

use crate::domain::Record;
use crate::utils::error::{EtlError, Result};
use serde_json::{json, Value};

/// A pure record-to-record normalization step. Records go in by value and
/// come back out transformed, so no step observes another's in-place
/// mutation. A required source field that is absent aborts the run.
#[derive(Debug, Clone)]
pub enum Transformation {
    /// Normalizes sentinel "no warranty" strings to a true null.
    HandleNoWarrantyString { no_warranty_strings: Vec<String> },
    /// Converts `price` into the target currency.
    PriceConverter { currency_factor: f64 },
    /// Flattens the nested `seller.id` into a top-level `seller_id`.
    InsertSellerId,
    /// Flattens the nested completed-sales counter into `completed_sales`.
    InsertSellerCompletedSales,
    /// Replaces the nested `shipping` object with its tag list; an empty tag
    /// list becomes `[null]` so each item still yields one shipping row.
    ShippingMethods,
}

impl Transformation {
    pub fn apply(&self, mut record: Record) -> Result<Record> {
        match self {
            Transformation::HandleNoWarrantyString {
                no_warranty_strings,
            } => {
                if let Some(warranty) = record.opt_str_field("warranty") {
                    if no_warranty_strings.iter().any(|s| s == warranty) {
                        record.insert("warranty", Value::Null);
                    }
                }
            }
            Transformation::PriceConverter { currency_factor } => {
                let price = record.f64_field("price")?;
                record.insert("price", json!(price * currency_factor));
            }
            Transformation::InsertSellerId => {
                let seller_id = record
                    .get("seller")
                    .and_then(|v| v.pointer("/id"))
                    .and_then(Value::as_i64)
                    .ok_or_else(|| EtlError::missing_field("seller.id"))?;
                record.insert("seller_id", json!(seller_id));
            }
            Transformation::InsertSellerCompletedSales => {
                let completed = record
                    .get("seller")
                    .and_then(|v| v.pointer("/seller_reputation/metrics/sales/completed"))
                    .and_then(Value::as_i64)
                    .ok_or_else(|| {
                        EtlError::missing_field("seller.seller_reputation.metrics.sales.completed")
                    })?;
                record.insert("completed_sales", json!(completed));
            }
            Transformation::ShippingMethods => {
                let tags = record
                    .get("shipping")
                    .and_then(|v| v.pointer("/tags"))
                    .and_then(Value::as_array)
                    .cloned()
                    .ok_or_else(|| EtlError::missing_field("shipping.tags"))?;
                let tags = if tags.is_empty() {
                    vec![Value::Null]
                } else {
                    tags
                };
                record.insert("shipping", Value::Array(tags));
            }
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_no_warranty_sentinel_becomes_null() {
        let tr = Transformation::HandleNoWarrantyString {
            no_warranty_strings: vec!["Sem garantia".to_string()],
        };

        let out = tr.apply(record(json!({"warranty": "Sem garantia"}))).unwrap();
        assert_eq!(out.get("warranty"), Some(&Value::Null));

        let out = tr.apply(record(json!({"warranty": "12 meses"}))).unwrap();
        assert_eq!(out.get("warranty"), Some(&json!("12 meses")));
    }

    #[test]
    fn test_price_converter_multiplies_by_factor() {
        let tr = Transformation::PriceConverter {
            currency_factor: 0.2,
        };
        let out = tr.apply(record(json!({"price": 100.0}))).unwrap();
        assert_eq!(out.f64_field("price").unwrap(), 20.0);
    }

    #[test]
    fn test_seller_fields_are_flattened() {
        let input = record(json!({
            "seller": {
                "id": 7,
                "seller_reputation": {"metrics": {"sales": {"completed": 42}}}
            }
        }));

        let out = Transformation::InsertSellerId.apply(input).unwrap();
        let out = Transformation::InsertSellerCompletedSales.apply(out).unwrap();

        assert_eq!(out.i64_field("seller_id").unwrap(), 7);
        assert_eq!(out.i64_field("completed_sales").unwrap(), 42);
    }

    #[test]
    fn test_shipping_tags_replace_nested_object() {
        let out = Transformation::ShippingMethods
            .apply(record(json!({"shipping": {"tags": ["fulfillment"]}})))
            .unwrap();
        assert_eq!(out.get("shipping"), Some(&json!(["fulfillment"])));
    }

    #[test]
    fn test_empty_shipping_tags_become_single_null() {
        let out = Transformation::ShippingMethods
            .apply(record(json!({"shipping": {"tags": []}})))
            .unwrap();
        assert_eq!(out.get("shipping"), Some(&json!([null])));
    }

    #[test]
    fn test_missing_source_field_is_an_error() {
        let err = Transformation::InsertSellerId
            .apply(record(json!({"id": "MLB1"})))
            .unwrap_err();
        assert!(matches!(err, EtlError::MissingField { .. }));
    }
}
