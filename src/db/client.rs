//! Bulk inserts and pre-filter lookups against the SQLite store.
//!
//! Entity batches arrive as `Record`s whose keys match column names. Each
//! insert call runs in its own transaction with one commit; there is no
//! all-or-nothing transaction around a full run.

use crate::domain::Record;
use crate::metrics::{table_name, MetricsRegistry, TimingSample};
use crate::utils::error::Result;
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct DbClient {
    pool: SqlitePool,
    metrics: Arc<MetricsRegistry>,
}

impl DbClient {
    pub fn new(pool: SqlitePool, metrics: Arc<MetricsRegistry>) -> Self {
        Self { pool, metrics }
    }

    pub async fn insert_items(&self, items: &[Record]) -> Result<()> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query(
                "INSERT INTO items (id, seller_id, title, sold_quantity, price, warranty, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))",
            )
            .bind(item.str_field("id")?)
            .bind(item.i64_field("seller_id")?)
            .bind(item.str_field("title")?)
            .bind(item.i64_field("sold_quantity")?)
            .bind(item.f64_field("price")?)
            .bind(item.opt_str_field("warranty"))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        self.metrics.record_insert(table_name::ITEMS, started.elapsed());
        Ok(())
    }

    pub async fn insert_item_shipping(&self, shippings: &[Record]) -> Result<()> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;
        for shipping in shippings {
            sqlx::query(
                "INSERT INTO item_shipping (item_id, shipping_method, date) \
                 VALUES (?1, ?2, datetime('now'))",
            )
            .bind(shipping.str_field("item_id")?)
            .bind(shipping.opt_str_field("shipping_method"))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        self.metrics
            .record_insert(table_name::ITEM_SHIPPING, started.elapsed());
        Ok(())
    }

    pub async fn insert_sellers(&self, sellers: &[Record]) -> Result<()> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;
        for seller in sellers {
            sqlx::query(
                "INSERT INTO sellers (seller_id, completed_sales, date) \
                 VALUES (?1, ?2, datetime('now'))",
            )
            .bind(seller.i64_field("seller_id")?)
            .bind(seller.i64_field("completed_sales")?)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        self.metrics
            .record_insert(table_name::SELLERS, started.elapsed());
        Ok(())
    }

    pub async fn insert_request_metrics(&self, samples: &[TimingSample]) -> Result<()> {
        self.insert_metric_samples(
            "INSERT INTO request_metrics (date, api_name, request_time) VALUES (?1, ?2, ?3)",
            samples,
        )
        .await
    }

    pub async fn insert_database_metrics(&self, samples: &[TimingSample]) -> Result<()> {
        self.insert_metric_samples(
            "INSERT INTO database_metrics (date, table_name, insert_time) VALUES (?1, ?2, ?3)",
            samples,
        )
        .await
    }

    pub async fn insert_process_metrics(&self, samples: &[TimingSample]) -> Result<()> {
        self.insert_metric_samples(
            "INSERT INTO process_metrics (date, process_name, process_time) VALUES (?1, ?2, ?3)",
            samples,
        )
        .await
    }

    async fn insert_metric_samples(&self, sql: &str, samples: &[TimingSample]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for sample in samples {
            sqlx::query(sql)
                .bind(sample.recorded_at)
                .bind(&sample.name)
                .bind(sample.seconds)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Item ids inserted today, used to skip listings already harvested in
    /// the current day's run.
    pub async fn current_day_item_ids(&self) -> Result<HashSet<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM items WHERE date(created_at) = date('now')",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    /// All (seller_id, completed_sales) pairs on file. A seller reappearing
    /// with an unchanged sales counter is considered already known.
    pub async fn sellers_on_file(&self) -> Result<HashSet<(i64, i64)>> {
        let pairs = sqlx::query_as::<_, (i64, i64)>("SELECT seller_id, completed_sales FROM sellers")
            .fetch_all(&self.pool)
            .await?;
        Ok(pairs.into_iter().collect())
    }
}
