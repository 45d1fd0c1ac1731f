//! Catalog storage: brands, categories, products
//!
//! All writes are single-statement upserts so that re-running an import is
//! harmless. A page is written inside one transaction; dropping the
//! transaction without committing (an error anywhere in the page) rolls the
//! whole page back.

use crate::normalize::ValidProduct;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

/// Stored in place of an empty brand or category name.
pub const UNKNOWN_REFERENCE_NAME: &str = "Unknown";

/// Lookup tables a product points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Brand,
    Category,
}

impl ReferenceKind {
    pub fn table(self) -> &'static str {
        match self {
            ReferenceKind::Brand => "brands",
            ReferenceKind::Category => "categories",
        }
    }

    // Insert, or bump updated_at on a name clash, and hand back the id either way.
    fn upsert_sql(self) -> &'static str {
        match self {
            ReferenceKind::Brand => {
                r#"
                INSERT INTO brands (name)
                VALUES ($1)
                ON CONFLICT (name)
                DO UPDATE SET updated_at = NOW()
                RETURNING id
                "#
            },
            ReferenceKind::Category => {
                r#"
                INSERT INTO categories (name)
                VALUES ($1)
                ON CONFLICT (name)
                DO UPDATE SET updated_at = NOW()
                RETURNING id
                "#
            },
        }
    }
}

/// Name actually stored for a brand or category
pub fn reference_name(name: &str) -> &str {
    if name.trim().is_empty() {
        UNKNOWN_REFERENCE_NAME
    } else {
        name
    }
}

/// Storage handler for the product catalog
#[derive(Debug, Clone)]
pub struct CatalogStorage {
    db: PgPool,
}

impl CatalogStorage {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Store one page of products in a single transaction.
    ///
    /// Returns the number of products written. On error nothing from this
    /// page is kept.
    #[instrument(skip_all, fields(products = products.len()))]
    pub async fn store_page(&self, products: &[ValidProduct]) -> sqlx::Result<usize> {
        let mut tx = self.db.begin().await?;

        for product in products {
            let brand_id = self.resolve_brand(&mut tx, &product.brand).await?;
            let category_id = self.resolve_category(&mut tx, &product.category).await?;
            self.upsert_product(&mut tx, product, brand_id, category_id).await?;
        }

        tx.commit().await?;

        Ok(products.len())
    }

    /// Id of the brand called `name`, creating it on first sight
    pub async fn resolve_brand(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> sqlx::Result<i64> {
        self.resolve_reference(tx, ReferenceKind::Brand, name).await
    }

    /// Id of the category called `name`, creating it on first sight
    pub async fn resolve_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> sqlx::Result<i64> {
        self.resolve_reference(tx, ReferenceKind::Category, name).await
    }

    async fn resolve_reference(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        kind: ReferenceKind,
        name: &str,
    ) -> sqlx::Result<i64> {
        let name = reference_name(name);

        let id: i64 = sqlx::query_scalar(kind.upsert_sql())
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;

        debug!(table = kind.table(), name, id, "Resolved reference");

        Ok(id)
    }

    /// Insert the product or overwrite every mutable column of the existing
    /// row with the same barcode. Nulls overwrite stored values.
    pub async fn upsert_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &ValidProduct,
        brand_id: i64,
        category_id: i64,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                barcode,
                name,
                image_url,
                brand_id,
                category_id,
                energy_kcal,
                fat,
                carbs,
                protein,
                salt
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (barcode)
            DO UPDATE SET
                name = EXCLUDED.name,
                image_url = EXCLUDED.image_url,
                brand_id = EXCLUDED.brand_id,
                category_id = EXCLUDED.category_id,
                energy_kcal = EXCLUDED.energy_kcal,
                fat = EXCLUDED.fat,
                carbs = EXCLUDED.carbs,
                protein = EXCLUDED.protein,
                salt = EXCLUDED.salt,
                updated_at = NOW()
            "#,
        )
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.image_url)
        .bind(brand_id)
        .bind(category_id)
        .bind(product.nutrients.energy_kcal)
        .bind(product.nutrients.fat)
        .bind(product.nutrients.carbohydrates)
        .bind(product.nutrients.proteins)
        .bind(product.nutrients.salt)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
