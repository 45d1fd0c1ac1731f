//! End-to-end import tests: mock Open Food Facts + throwaway database
//!
//! Requires `DATABASE_URL` (see `storage_tests.rs`).

use larder_ingest::{ImportError, ImportPipeline};
use serde_json::json;
use sqlx::PgPool;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::{count, mount_empty_fallback, mount_page, requested_pages, test_config, SEARCH_PATH};

type ProductRow = (
    String,
    String,
    String,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

async fn product_row(pool: &PgPool, barcode: &str) -> ProductRow {
    sqlx::query_as(
        r#"
        SELECT p.name, b.name, c.name, p.energy_kcal, p.fat, p.carbs, p.protein, p.salt
        FROM products p
        JOIN brands b ON b.id = p.brand_id
        JOIN categories c ON c.id = p.category_id
        WHERE p.barcode = $1
        "#,
    )
    .bind(barcode)
    .fetch_one(pool)
    .await
    .expect("product row")
}

// ============================================================================
// Happy Path
// ============================================================================

#[sqlx::test(migrator = "larder_ingest::db::MIGRATOR")]
async fn test_import_single_product(pool: PgPool) {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        json!([{
            "code": "123",
            "product_name": "Choc Bar",
            "brands": "Acme, Foo",
            "categories": "Snacks, Sweets",
            "energy-kcal_100g": 500
        }]),
    )
    .await;
    mount_empty_fallback(&server).await;

    let pipeline = ImportPipeline::new(test_config(&server), pool.clone()).unwrap();
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.products_imported, 1);
    assert_eq!(count(&pool, "products").await, 1);
    assert_eq!(count(&pool, "brands").await, 1);
    assert_eq!(count(&pool, "categories").await, 1);

    let row = product_row(&pool, "123").await;
    assert_eq!(
        row,
        (
            "Choc Bar".to_string(),
            "Acme".to_string(),
            "Snacks".to_string(),
            Some(500.0),
            None,
            None,
            None,
            None,
        )
    );
}

#[sqlx::test(migrator = "larder_ingest::db::MIGRATOR")]
async fn test_import_fetches_exactly_ten_pages_in_order(pool: PgPool) {
    let server = MockServer::start().await;
    mount_empty_fallback(&server).await;

    let pipeline = ImportPipeline::new(test_config(&server), pool.clone()).unwrap();
    let stats = pipeline.run().await.unwrap();

    // Empty pages do not end the run early
    assert_eq!(requested_pages(&server).await, (1..=10).collect::<Vec<u32>>());
    assert_eq!(stats.pages_fetched, 10);
    assert_eq!(stats.products_imported, 0);
    assert_eq!(count(&pool, "products").await, 0);
}

#[sqlx::test(migrator = "larder_ingest::db::MIGRATOR")]
async fn test_import_drops_incomplete_records(pool: PgPool) {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        json!([
            { "code": null, "product_name": "X", "brands": "Ghost" },
            { "code": "456", "product_name": "", "brands": "Ghost" },
            { "code": 789, "product_name": "Numeric Code", "categories": "" },
        ]),
    )
    .await;
    mount_empty_fallback(&server).await;

    let pipeline = ImportPipeline::new(test_config(&server), pool.clone()).unwrap();
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.records_received, 3);
    assert_eq!(stats.records_dropped, 2);
    assert_eq!(stats.products_imported, 1);

    // Dropped records never create reference rows
    let brands: Vec<String> = sqlx::query_scalar("SELECT name FROM brands")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(brands, vec!["Unknown".to_string()]);

    let row = product_row(&pool, "789").await;
    assert_eq!(row.0, "Numeric Code");
    assert_eq!(row.2, "Unknown");
}

#[sqlx::test(migrator = "larder_ingest::db::MIGRATOR")]
async fn test_rerun_is_idempotent(pool: PgPool) {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        json!([
            { "code": "1", "product_name": "Oats", "brands": "Acme", "categories": "Cereals" },
            { "code": "2", "product_name": "Muesli", "brands": "Acme", "categories": "Cereals" },
        ]),
    )
    .await;
    mount_page(
        &server,
        2,
        json!([
            { "code": "1", "product_name": "Oats", "brands": "Acme", "categories": "Cereals" },
        ]),
    )
    .await;
    mount_empty_fallback(&server).await;

    let pipeline = ImportPipeline::new(test_config(&server), pool.clone()).unwrap();
    pipeline.run().await.unwrap();
    pipeline.run().await.unwrap();

    assert_eq!(count(&pool, "products").await, 2);
    assert_eq!(count(&pool, "brands").await, 1);
    assert_eq!(count(&pool, "categories").await, 1);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[sqlx::test(migrator = "larder_ingest::db::MIGRATOR")]
async fn test_http_failure_aborts_run_after_committed_pages(pool: PgPool) {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        json!([{ "code": "1", "product_name": "Oats", "brands": "Acme" }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_empty_fallback(&server).await;

    let pipeline = ImportPipeline::new(test_config(&server), pool.clone()).unwrap();
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, ImportError::Http(_)), "got {err:?}");
    assert_eq!(count(&pool, "products").await, 1);
    assert_eq!(requested_pages(&server).await, vec![1, 2]);
}

#[sqlx::test(migrator = "larder_ingest::db::MIGRATOR")]
async fn test_storage_failure_rolls_back_page(pool: PgPool) {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        json!([
            { "code": "1", "product_name": "Oats", "brands": "Acme" },
            { "code": "9".repeat(60), "product_name": "Too Long", "brands": "Other" },
        ]),
    )
    .await;
    mount_empty_fallback(&server).await;

    let pipeline = ImportPipeline::new(test_config(&server), pool.clone()).unwrap();
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, ImportError::Storage(_)), "got {err:?}");
    assert_eq!(count(&pool, "products").await, 0);
    assert_eq!(count(&pool, "brands").await, 0);
    assert_eq!(requested_pages(&server).await, vec![1]);
}

#[sqlx::test(migrator = "larder_ingest::db::MIGRATOR")]
async fn test_invalid_config_is_rejected(pool: PgPool) {
    let server = MockServer::start().await;
    let config = larder_ingest::ImportConfig {
        page_size: 0,
        ..test_config(&server)
    };

    let result = ImportPipeline::new(config, pool);
    assert!(matches!(result, Err(ImportError::Config(_))));
}
