//! End-to-end pipeline runs against a mocked marketplace API and an
//! in-memory SQLite store.

use httpmock::prelude::*;
use meli_etl::db::{create_schema, DbClient};
use meli_etl::{etl_factory, EtlError, EtlPipeline, MeliClient, MetricsRegistry};
use serde_json::json;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

fn search_result(
    id: &str,
    price: f64,
    seller_id: i64,
    completed_sales: i64,
    tags: serde_json::Value,
) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Iphone 11",
        "condition": "new",
        "sold_quantity": 3,
        "price": price,
        "thumbnail": "http://example.com/x.jpg",
        "seller": {
            "id": seller_id,
            "seller_reputation": {"metrics": {"sales": {"completed": completed_sales}}}
        },
        "shipping": {"tags": tags}
    })
}

fn mock_marketplace(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/currency_conversions/search")
            .query_param("from", "BRL")
            .query_param("to", "USD");
        then.status(200).json_body(json!({"ratio": 0.2}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/sites/MLB/search")
            .query_param("offset", "0");
        then.status(200).json_body(json!({
            "results": [
                search_result("MLB1", 100.0, 7, 42, json!(["fulfillment", "self_service_in"])),
                search_result("MLB2", 50.0, 8, 10, json!([]))
            ]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/sites/MLB/search")
            .query_param("offset", "50");
        then.status(200).json_body(json!({"results": []}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/items/MLB1");
        then.status(200).json_body(json!({"warranty": "Sem garantia"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/items/MLB2");
        then.status(200).json_body(json!({"warranty": "12 meses"}));
    });
}

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool, false).await.unwrap();
    pool
}

async fn run_pipeline(server: &MockServer, pool: &SqlitePool) -> meli_etl::Result<()> {
    let metrics = Arc::new(MetricsRegistry::new());
    let client = MeliClient::new(&server.base_url(), "MLB", metrics.clone());
    let db = DbClient::new(pool.clone(), metrics.clone());
    let (extractor, transformer, loader) = etl_factory(client, db, metrics.clone()).await?;
    let pipeline = EtlPipeline::new(extractor, transformer, loader, metrics);
    pipeline.run("Iphone 11", 999, 10).await
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_run_persists_entities_and_metrics() {
    let server = MockServer::start();
    mock_marketplace(&server);
    let pool = test_pool().await;

    run_pipeline(&server, &pool).await.unwrap();

    assert_eq!(count(&pool, "items").await, 2);
    // Two tagged rows for MLB1 plus one null-method row for tagless MLB2.
    assert_eq!(count(&pool, "item_shipping").await, 3);
    assert_eq!(count(&pool, "sellers").await, 2);

    let (price, warranty): (f64, Option<String>) =
        sqlx::query_as("SELECT price, warranty FROM items WHERE id = 'MLB1'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(price, 20.0);
    assert_eq!(warranty, None);

    let warranty: Option<String> =
        sqlx::query_scalar("SELECT warranty FROM items WHERE id = 'MLB2'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(warranty.as_deref(), Some("12 meses"));

    let null_methods: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM item_shipping WHERE item_id = 'MLB2' AND shipping_method IS NULL",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(null_methods, 1);

    // Two search pages, two attribute lookups, one currency lookup.
    assert_eq!(count(&pool, "request_metrics").await, 5);
    // One insert sample per entity table.
    assert_eq!(count(&pool, "database_metrics").await, 3);
    // Extract, transform and load stage samples.
    assert_eq!(count(&pool, "process_metrics").await, 3);
}

#[tokio::test]
async fn test_second_run_on_the_same_day_finds_nothing_new() {
    let server = MockServer::start();
    mock_marketplace(&server);
    let pool = test_pool().await;

    run_pipeline(&server, &pool).await.unwrap();

    // Everything the API offers is already stored today, so the item filter
    // rejects every record and extraction fails with the no-results error.
    let err = run_pipeline(&server, &pool).await.unwrap_err();
    assert!(matches!(err, EtlError::NoResults));

    assert_eq!(count(&pool, "items").await, 2);
    assert_eq!(count(&pool, "sellers").await, 2);
}
