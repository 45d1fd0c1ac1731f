// Open Food Facts search API
//
// - client: one reused HTTP session, fixed field projection, bounded retries
// - retry: which failures are retried and how long to wait
// - models: lenient payload types for the search response

pub mod client;
pub mod models;
pub mod retry;

pub use client::OffClient;
pub use models::{RawProduct, SearchResponse};
pub use retry::RetryPolicy;

/// Fields requested from the search endpoint
pub const PRODUCT_FIELDS: &str = "code,product_name,brands,categories,energy-kcal_100g,fat_100g,carbohydrates_100g,proteins_100g,salt_100g,image_url";
