//! Supplier repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use catalog_core::{SupplierId, SupplierKind};

use super::{RepositoryError, unique_violation};
use crate::models::{Address, Supplier};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    document: String,
    kind: SupplierKind,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SupplierRow> for Supplier {
    type Error = RepositoryError;

    fn try_from(row: SupplierRow) -> Result<Self, Self::Error> {
        if row.document.len() != row.kind.document_length() {
            return Err(RepositoryError::DataCorruption(format!(
                "supplier {} has a {}-digit document but is {}",
                row.id,
                row.document.len(),
                row.kind
            )));
        }

        Ok(Self {
            id: SupplierId::new(row.id),
            name: row.name,
            document: row.document,
            kind: row.kind,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SUPPLIER_COLUMNS: &str = "id, name, document, kind, active, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for supplier database operations.
pub struct SupplierRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SupplierRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all suppliers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM catalog.supplier ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a supplier by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM catalog.supplier WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Whether another supplier already uses this document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn document_in_use(
        &self,
        document: &str,
        excluding: Option<SupplierId>,
    ) -> Result<bool, RepositoryError> {
        let in_use: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM catalog.supplier
                WHERE document = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            ",
        )
        .bind(document)
        .bind(excluding)
        .fetch_one(self.pool)
        .await?;

        Ok(in_use)
    }

    /// Whether the supplier owns at least one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_products(&self, id: SupplierId) -> Result<bool, RepositoryError> {
        let has: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM catalog.product WHERE supplier_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(has)
    }

    /// Count all suppliers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog.supplier")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a supplier and its address in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the document is already registered.
    pub async fn insert_with_address(
        &self,
        supplier: &Supplier,
        address: &Address,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO catalog.supplier (id, name, document, kind, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.document)
        .bind(supplier.kind)
        .bind(supplier.active)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, "supplier document"))?;

        sqlx::query(
            r"
            INSERT INTO catalog.address
                (id, supplier_id, street, number, complement, zip_code, neighborhood, city, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(address.id)
        .bind(supplier.id)
        .bind(&address.street)
        .bind(&address.number)
        .bind(&address.complement)
        .bind(&address.zip_code)
        .bind(&address.neighborhood)
        .bind(&address.city)
        .bind(&address.state)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Update the editable supplier fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the supplier does not exist.
    /// Returns `RepositoryError::Conflict` if the document is already registered.
    pub async fn update(&self, supplier: &Supplier) -> Result<Supplier, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r"
            UPDATE catalog.supplier
            SET name = $2, document = $3, kind = $4, active = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {SUPPLIER_COLUMNS}
            "
        ))
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.document)
        .bind(supplier.kind)
        .bind(supplier.active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| unique_violation(e, "supplier document"))?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a supplier and its address.
    ///
    /// The product foreign key is `ON DELETE RESTRICT`, so a supplier that
    /// still has products makes this fail with a database error; callers
    /// check [`Self::has_products`] first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the supplier does not exist.
    pub async fn delete(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM catalog.address WHERE supplier_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM catalog.supplier WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
