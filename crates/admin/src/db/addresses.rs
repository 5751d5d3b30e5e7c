//! Address repository.

use sqlx::PgPool;
use uuid::Uuid;

use catalog_core::{AddressId, SupplierId};

use super::RepositoryError;
use crate::models::Address;

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: Uuid,
    supplier_id: Uuid,
    street: String,
    number: String,
    complement: Option<String>,
    zip_code: String,
    neighborhood: String,
    city: String,
    state: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            supplier_id: SupplierId::new(row.supplier_id),
            street: row.street,
            number: row.number,
            complement: row.complement,
            zip_code: row.zip_code,
            neighborhood: row.neighborhood,
            city: row.city,
            state: row.state,
        }
    }
}

/// Repository for supplier addresses.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the address of a supplier, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_supplier(
        &self,
        supplier_id: SupplierId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, supplier_id, street, number, complement, zip_code,
                   neighborhood, city, state
            FROM catalog.address
            WHERE supplier_id = $1
            ",
        )
        .bind(supplier_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Address::from))
    }

    /// Insert the address, or replace the supplier's existing one.
    ///
    /// The stored row keeps its original ID when it already existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, address: &Address) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            INSERT INTO catalog.address
                (id, supplier_id, street, number, complement, zip_code, neighborhood, city, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (supplier_id) DO UPDATE SET
                street = EXCLUDED.street,
                number = EXCLUDED.number,
                complement = EXCLUDED.complement,
                zip_code = EXCLUDED.zip_code,
                neighborhood = EXCLUDED.neighborhood,
                city = EXCLUDED.city,
                state = EXCLUDED.state
            RETURNING id, supplier_id, street, number, complement, zip_code,
                      neighborhood, city, state
            ",
        )
        .bind(address.id)
        .bind(address.supplier_id)
        .bind(&address.street)
        .bind(&address.number)
        .bind(&address.complement)
        .bind(&address.zip_code)
        .bind(&address.neighborhood)
        .bind(&address.city)
        .bind(&address.state)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}
