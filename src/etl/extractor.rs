//! Extraction: paginated search, per-page filtering and warranty enrichment.

use crate::api::MeliClient;
use crate::domain::Record;
use crate::etl::filter::Filter;
use crate::metrics::api_name;
use crate::utils::error::{EtlError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;

/// Search page size, fixed by the upstream API contract.
const PAGE_LIMIT: usize = 50;
/// Cap on concurrent attribute lookups during the enrichment fan-out.
const MAX_CONCURRENT_LOOKUPS: usize = 100;

pub struct Extractor {
    client: MeliClient,
    filter: Option<Filter>,
}

impl Extractor {
    pub fn new(client: MeliClient, filter: Option<Filter>) -> Self {
        Self { client, filter }
    }

    /// Pages the search endpoint until `max_items` records survive the
    /// filter, a page comes back empty, or a page request fails (soft stop).
    /// Zero surviving items is the one fatal condition in extraction. The
    /// selected items are then enriched with their `warranty` attribute.
    pub async fn search(
        &self,
        query: &str,
        exclude_seller_id: i64,
        max_items: usize,
    ) -> Result<Vec<Record>> {
        let mut item_list: Vec<Record> = Vec::new();
        let mut offset = 0;

        while item_list.len() < max_items {
            let page = self
                .client
                .search_page(query, exclude_seller_id, offset, PAGE_LIMIT)
                .await?;
            if page.status != 200 {
                tracing::warn!(
                    status = page.status,
                    "search page request failed, stopping pagination"
                );
                break;
            }

            let results = page
                .body
                .get("results")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if results.is_empty() {
                break;
            }

            let batch_len = results.len();
            let mut records: Vec<Record> =
                results.into_iter().filter_map(Record::from_value).collect();
            if let Some(filter) = &self.filter {
                records = filter.apply_to_all(records);
            }
            let kept = records.len();
            item_list.extend(records);

            tracing::info!(
                "{}/{} items. {} items were received and {} were filtered",
                item_list.len(),
                max_items,
                batch_len,
                batch_len - kept
            );
            offset += PAGE_LIMIT;
        }

        if item_list.is_empty() {
            return Err(EtlError::NoResults);
        }
        if item_list.len() > max_items {
            tracing::warn!("{} items were left out", item_list.len() - max_items);
            item_list.truncate(max_items);
        }

        self.fetch_warranties(item_list).await
    }

    /// The search response does not carry the warranty, so each selected item
    /// gets a concurrent attributes lookup, bounded by the worker cap. One
    /// failed lookup aborts the whole run; there is no partial-success path.
    async fn fetch_warranties(&self, items: Vec<Record>) -> Result<Vec<Record>> {
        let lookups = items.into_iter().map(|item| self.fetch_warranty(item));
        stream::iter(lookups)
            .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
            .try_collect()
            .await
    }

    async fn fetch_warranty(&self, mut item: Record) -> Result<Record> {
        let item_id = item.str_field("id")?.to_string();
        let response = self.client.item_attributes(&item_id).await?;
        if response.status != 200 {
            return Err(EtlError::UpstreamStatus {
                api: api_name::ITEM_ATTRIBUTES,
                status: response.status,
            });
        }
        let warranty = response.body.get("warranty").cloned().unwrap_or(Value::Null);
        item.insert("warranty", warranty);
        Ok(item)
    }
}
