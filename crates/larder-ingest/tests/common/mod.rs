//! Shared helpers for larder-ingest integration tests
#![allow(dead_code)]

use larder_ingest::off::RetryPolicy;
use larder_ingest::ImportConfig;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEARCH_PATH: &str = "/cgi/search.pl";

/// Import settings pointed at the mock server, with no pacing or backoff
pub fn test_config(server: &MockServer) -> ImportConfig {
    ImportConfig {
        base_url: server.uri(),
        page_delay: Duration::ZERO,
        retry: RetryPolicy::immediate(3),
        ..ImportConfig::default()
    }
}

pub fn page_body(products: Value) -> Value {
    json!({
        "count": 1234,
        "page_size": 50,
        "products": products
    })
}

/// Serve `products` for one page number
pub async fn mount_page(server: &MockServer, page: u32, products: Value) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(products)))
        .mount(server)
        .await;
}

/// Answer every page not mounted before this call with an empty product list
pub async fn mount_empty_fallback(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(json!([]))))
        .mount(server)
        .await;
}

/// Page numbers of the search requests the server saw, in arrival order
pub async fn requested_pages(server: &MockServer) -> Vec<u32> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
        .collect()
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count query")
}
