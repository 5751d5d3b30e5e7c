//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use catalog_core::{Price, ProductId, SupplierId};

use super::RepositoryError;
use crate::models::{Product, ProductWithSupplier};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    supplier_id: Uuid,
    name: String,
    description: String,
    image: String,
    price: Decimal,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            supplier_id: SupplierId::new(row.supplier_id),
            name: row.name,
            description: row.description,
            image: row.image,
            price,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductWithSupplierRow {
    #[sqlx(flatten)]
    product: ProductRow,
    supplier_name: String,
}

impl TryFrom<ProductWithSupplierRow> for ProductWithSupplier {
    type Error = RepositoryError;

    fn try_from(row: ProductWithSupplierRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product: row.product.try_into()?,
            supplier_name: row.supplier_name,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "p.id, p.supplier_id, p.name, p.description, p.image, p.price, p.active, p.created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products with their supplier's name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_suppliers(&self) -> Result<Vec<ProductWithSupplier>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductWithSupplierRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}, s.name AS supplier_name
            FROM catalog.product p
            JOIN catalog.supplier s ON s.id = p.supplier_id
            ORDER BY p.created_at DESC, p.id
            "
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get one product with its supplier's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_supplier(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductWithSupplier>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductWithSupplierRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}, s.name AS supplier_name
            FROM catalog.product p
            JOIN catalog.supplier s ON s.id = p.supplier_id
            WHERE p.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List the products of one supplier, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_supplier(
        &self,
        supplier_id: SupplierId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM catalog.product p
            WHERE p.supplier_id = $1
            ORDER BY p.name, p.id
            "
        ))
        .bind(supplier_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, including when
    /// the supplier does not exist.
    pub async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO catalog.product
                (id, supplier_id, name, description, image, price, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(product.id)
        .bind(product.supplier_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.price)
        .bind(product.active)
        .bind(product.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Update a product. The creation timestamp never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catalog.product
            SET supplier_id = $2, name = $3, description = $4, image = $5,
                price = $6, active = $7
            WHERE id = $1
            ",
        )
        .bind(product.id)
        .bind(product.supplier_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.price)
        .bind(product.active)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
