//! Configuration management
//!
//! Only the database target comes from the environment. Everything about the
//! import itself is a compile-time default in [`ImportConfig`]; tests build
//! their own `ImportConfig` to point at a mock API and skip the pacing delay.

use crate::error::{ImportError, Result};
use crate::off::RetryPolicy;
use std::time::Duration;

// ============================================================================
// Import Constants
// ============================================================================

/// Open Food Facts host.
pub const DEFAULT_API_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Legacy search endpoint, relative to the base URL.
pub const SEARCH_PATH: &str = "/cgi/search.pl";

/// Pages fetched per run. A fixed ceiling: the total result count in the
/// response is never consulted.
pub const DEFAULT_PAGE_COUNT: u32 = 10;

/// Products requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Pause before every page request.
pub const DEFAULT_PAGE_DELAY_SECS: u64 = 2;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Open Food Facts asks API clients to identify themselves.
pub const USER_AGENT: &str = concat!("larder-ingest/", env!("CARGO_PKG_VERSION"));

/// How long to wait for the database connection before giving up.
pub const DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Complete configuration for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub import: ImportConfig,
}

/// Database target
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub acquire_timeout_secs: u64,
}

/// Import tunables
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub base_url: String,
    pub page_count: u32,
    pub page_size: u32,
    pub page_delay: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            page_count: DEFAULT_PAGE_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_secs(DEFAULT_PAGE_DELAY_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl ImportConfig {
    /// Full URL of the search endpoint
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ImportError::config("API base URL cannot be empty"));
        }

        if self.page_count == 0 {
            return Err(ImportError::config("Page count must be greater than 0"));
        }

        if self.page_size == 0 {
            return Err(ImportError::config("Page size must be greater than 0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(ImportError::config("Retry policy needs at least one attempt"));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from `.env` / the process environment.
    ///
    /// `DATABASE_URL` is required; there is no default target.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| ImportError::config("DATABASE_URL environment variable is required"))?;

        let config = Self::for_database(url);
        config.validate()?;

        Ok(config)
    }

    /// Default import settings against the given database
    pub fn for_database(url: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig {
                url: url.into(),
                acquire_timeout_secs: DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS,
            },
            import: ImportConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(ImportError::config("Database URL cannot be empty"));
        }

        self.import.validate()
    }
}
