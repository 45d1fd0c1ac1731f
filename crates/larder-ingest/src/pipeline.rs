// Import pipeline orchestration
//
// For each page 1..=page_count, strictly in order:
// 1. Wait the pacing delay
// 2. Fetch the page from Open Food Facts
// 3. Normalize every record and drop those without barcode or name
// 4. Resolve brand + category and upsert the product, all in one transaction
// 5. Commit
//
// The page ceiling is fixed. The response's total count is not consulted and
// an empty page does not end the run early.

use crate::config::ImportConfig;
use crate::error::Result;
use crate::normalize::{normalize, ValidProduct};
use crate::off::{OffClient, RawProduct};
use crate::storage::CatalogStorage;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument};

/// Totals for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStats {
    pub started_at: DateTime<Utc>,
    pub pages_fetched: u32,
    pub records_received: usize,
    pub records_dropped: usize,
    pub products_imported: usize,
}

impl ImportStats {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            pages_fetched: 0,
            records_received: 0,
            records_dropped: 0,
            products_imported: 0,
        }
    }

    fn record(&mut self, page: &PageStats) {
        self.pages_fetched += 1;
        self.records_received += page.received;
        self.records_dropped += page.received - page.imported;
        self.products_imported += page.imported;
    }
}

/// Counts for a single page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    pub page: u32,
    pub received: usize,
    pub imported: usize,
}

/// Open Food Facts → catalog import
pub struct ImportPipeline {
    config: ImportConfig,
    client: OffClient,
    storage: CatalogStorage,
}

impl ImportPipeline {
    pub fn new(config: ImportConfig, db: PgPool) -> Result<Self> {
        config.validate()?;
        let client = OffClient::new(&config)?;

        Ok(Self {
            config,
            client,
            storage: CatalogStorage::new(db),
        })
    }

    /// Run every page. The first error aborts the run; pages committed
    /// before it stay committed.
    pub async fn run(&self) -> Result<ImportStats> {
        info!(
            source = self.client.search_url(),
            pages = self.config.page_count,
            page_size = self.config.page_size,
            "Starting Open Food Facts import"
        );

        let mut stats = ImportStats::new();

        for page in 1..=self.config.page_count {
            let page_stats = self.import_page(page).await?;
            stats.record(&page_stats);
        }

        let elapsed = Utc::now() - stats.started_at;
        info!(
            pages = stats.pages_fetched,
            received = stats.records_received,
            dropped = stats.records_dropped,
            imported = stats.products_imported,
            elapsed_ms = elapsed.num_milliseconds(),
            "Import completed"
        );

        Ok(stats)
    }

    #[instrument(skip(self))]
    async fn import_page(&self, page: u32) -> Result<PageStats> {
        tokio::time::sleep(self.config.page_delay).await;

        info!(page, "Fetching page");
        let response = self.client.fetch_page(page).await?;

        let products = valid_products(&response.products);
        let imported = self.storage.store_page(&products).await?;

        info!(page, imported, "Imported products");

        Ok(PageStats {
            page,
            received: response.products.len(),
            imported,
        })
    }
}

/// Normalize a page of records, keeping API order and dropping the ones
/// that cannot be stored
pub fn valid_products(records: &[RawProduct]) -> Vec<ValidProduct> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match normalize(record).validate() {
            Ok(product) => Some(product),
            Err(reason) => {
                debug!(index, code = ?record.code, %reason, "Skipping record");
                None
            },
        })
        .collect()
}
