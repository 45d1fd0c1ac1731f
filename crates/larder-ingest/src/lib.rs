//! Larder Ingest Library
//!
//! Imports food products from the Open Food Facts search API into the Larder
//! PostgreSQL catalog (`brands`, `categories`, `products`).
//!
//! # Pipeline
//!
//! - [`off`]: paginated search client with retries and timeouts
//! - [`normalize`]: raw record → flat product, plus the validity filter
//! - [`storage`]: idempotent brand/category resolution and product upserts
//! - [`pipeline`]: page loop, pacing, one transaction per page
//!
//! # Example
//!
//! ```no_run
//! use larder_ingest::{db, Config, ImportPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!
//!     let stats = ImportPipeline::new(config.import, pool)?.run().await?;
//!     tracing::info!(imported = stats.products_imported, "done");
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
pub mod off;
pub mod pipeline;
pub mod storage;

pub use config::{Config, DatabaseConfig, ImportConfig};
pub use error::{HttpError, ImportError, Result};
pub use pipeline::{ImportPipeline, ImportStats};
pub use storage::CatalogStorage;
