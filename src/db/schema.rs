//! SQLite schema for products, sellers, shipping and timing metrics.

use crate::utils::error::Result;
use sqlx::sqlite::SqlitePool;

const TABLES: [&str; 6] = [
    "items",
    "item_shipping",
    "sellers",
    "request_metrics",
    "database_metrics",
    "process_metrics",
];

const DDL: [&str; 6] = [
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY,
        seller_id INTEGER,
        title TEXT NOT NULL,
        sold_quantity INTEGER NOT NULL,
        price REAL NOT NULL,
        warranty TEXT,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS item_shipping (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id TEXT NOT NULL,
        shipping_method TEXT,
        date DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sellers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        seller_id INTEGER NOT NULL,
        completed_sales INTEGER NOT NULL,
        date DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS request_metrics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date DATETIME,
        api_name TEXT NOT NULL,
        request_time REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS database_metrics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date DATETIME,
        table_name TEXT NOT NULL,
        insert_time REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS process_metrics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date DATETIME,
        process_name TEXT NOT NULL,
        process_time REAL NOT NULL
    )
    "#,
];

/// Creates all tables, optionally dropping existing ones first (`--new-db`).
pub async fn create_schema(pool: &SqlitePool, drop_existing: bool) -> Result<()> {
    if drop_existing {
        tracing::warn!("all data in the database will be deleted");
        for table in TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(pool)
                .await?;
        }
    }

    for ddl in DDL {
        sqlx::query(ddl).execute(pool).await?;
    }

    Ok(())
}
