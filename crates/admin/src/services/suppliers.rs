//! Supplier business rules.
//!
//! Every write validates first, then checks the rules that need the
//! database: unique documents and no deletion while products exist.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;

use catalog_core::{AddressId, SupplierId, ValidationErrors};

use crate::db::{AddressRepository, ProductRepository, RepositoryError, SupplierRepository};
use crate::models::{Address, AddressInput, Supplier, SupplierDetails, SupplierInput};

/// Errors from supplier operations.
#[derive(Debug, Error)]
pub enum SupplierServiceError {
    /// One or more fields broke a rule.
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("A supplier with this document already exists.")]
    DuplicateDocument,

    #[error("The supplier has registered products.")]
    HasProducts,

    #[error("supplier not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl SupplierServiceError {
    /// Messages to show on the form, or `None` for infrastructure failures.
    #[must_use]
    pub fn notifications(&self) -> Option<Vec<String>> {
        match self {
            Self::Validation(errors) => Some(errors.messages()),
            Self::DuplicateDocument | Self::HasProducts => Some(vec![self.to_string()]),
            Self::NotFound | Self::Repository(_) => None,
        }
    }
}

/// Supplier service.
pub struct SupplierService<'a> {
    suppliers: SupplierRepository<'a>,
    addresses: AddressRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> SupplierService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            suppliers: SupplierRepository::new(pool),
            addresses: AddressRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Register a supplier with its address.
    ///
    /// # Errors
    ///
    /// Returns `SupplierServiceError::Validation` with the errors of both the
    /// supplier and the address, or `DuplicateDocument` if the document is
    /// already registered.
    #[tracing::instrument(skip_all, fields(kind = %input.kind))]
    pub async fn add(
        &self,
        input: SupplierInput,
        address: AddressInput,
    ) -> Result<Supplier, SupplierServiceError> {
        let address = address.normalized();
        let mut errors = input.validate();
        errors.extend(address.validate());
        errors.into_result().map_err(SupplierServiceError::Validation)?;

        if self.suppliers.document_in_use(&input.document, None).await? {
            return Err(SupplierServiceError::DuplicateDocument);
        }

        let now = Utc::now();
        let supplier = Supplier {
            id: SupplierId::new_v4(),
            name: input.name,
            document: input.document,
            kind: input.kind,
            active: input.active,
            created_at: now,
            updated_at: now,
        };
        let address = address_from_input(supplier.id, AddressId::new_v4(), address);

        self.suppliers
            .insert_with_address(&supplier, &address)
            .await
            .map_err(map_conflict)?;

        tracing::info!(supplier_id = %supplier.id, "Supplier added");
        Ok(supplier)
    }

    /// Update name, document, kind and active flag.
    ///
    /// # Errors
    ///
    /// Returns `SupplierServiceError::NotFound` if the supplier doesn't exist,
    /// `Validation` for broken rules, or `DuplicateDocument` if another
    /// supplier already has the document.
    #[tracing::instrument(skip(self, input), fields(kind = %input.kind))]
    pub async fn update(
        &self,
        id: SupplierId,
        input: SupplierInput,
    ) -> Result<Supplier, SupplierServiceError> {
        input
            .validate()
            .into_result()
            .map_err(SupplierServiceError::Validation)?;

        let mut supplier = self
            .suppliers
            .get(id)
            .await?
            .ok_or(SupplierServiceError::NotFound)?;

        if self
            .suppliers
            .document_in_use(&input.document, Some(id))
            .await?
        {
            return Err(SupplierServiceError::DuplicateDocument);
        }

        supplier.name = input.name;
        supplier.document = input.document;
        supplier.kind = input.kind;
        supplier.active = input.active;

        let updated = self.suppliers.update(&supplier).await.map_err(|e| match e {
            RepositoryError::NotFound => SupplierServiceError::NotFound,
            other => map_conflict(other),
        })?;

        tracing::info!(supplier_id = %id, "Supplier updated");
        Ok(updated)
    }

    /// Replace the supplier's address.
    ///
    /// # Errors
    ///
    /// Returns `SupplierServiceError::NotFound` if the supplier doesn't exist
    /// or `Validation` for broken address rules.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_address(
        &self,
        supplier_id: SupplierId,
        input: AddressInput,
    ) -> Result<Address, SupplierServiceError> {
        let input = input.normalized();
        input
            .validate()
            .into_result()
            .map_err(SupplierServiceError::Validation)?;

        if self.suppliers.get(supplier_id).await?.is_none() {
            return Err(SupplierServiceError::NotFound);
        }

        let existing_id = self
            .addresses
            .get_by_supplier(supplier_id)
            .await?
            .map_or_else(AddressId::new_v4, |a| a.id);

        let address = self
            .addresses
            .upsert(&address_from_input(supplier_id, existing_id, input))
            .await?;

        tracing::info!(%supplier_id, "Supplier address updated");
        Ok(address)
    }

    /// Remove a supplier and its address.
    ///
    /// # Errors
    ///
    /// Returns `SupplierServiceError::NotFound` if the supplier doesn't exist
    /// or `HasProducts` while it still owns products.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: SupplierId) -> Result<(), SupplierServiceError> {
        if self.suppliers.get(id).await?.is_none() {
            return Err(SupplierServiceError::NotFound);
        }

        if self.suppliers.has_products(id).await? {
            return Err(SupplierServiceError::HasProducts);
        }

        self.suppliers.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => SupplierServiceError::NotFound,
            other => SupplierServiceError::Repository(other),
        })?;

        tracing::info!(supplier_id = %id, "Supplier removed");
        Ok(())
    }

    /// Load a supplier with its address and products.
    ///
    /// # Errors
    ///
    /// Returns `SupplierServiceError::NotFound` if the supplier doesn't exist.
    pub async fn details(&self, id: SupplierId) -> Result<SupplierDetails, SupplierServiceError> {
        let supplier = self
            .suppliers
            .get(id)
            .await?
            .ok_or(SupplierServiceError::NotFound)?;
        let address = self.addresses.get_by_supplier(id).await?;
        let products = self.products.list_by_supplier(id).await?;

        Ok(SupplierDetails {
            supplier,
            address,
            products,
        })
    }
}

fn address_from_input(supplier_id: SupplierId, id: AddressId, input: AddressInput) -> Address {
    Address {
        id,
        supplier_id,
        street: input.street,
        number: input.number,
        complement: input.complement,
        zip_code: input.zip_code,
        neighborhood: input.neighborhood,
        city: input.city,
        state: input.state,
    }
}

/// A unique violation that slipped past the pre-check (concurrent insert).
fn map_conflict(e: RepositoryError) -> SupplierServiceError {
    match e {
        RepositoryError::Conflict(_) => SupplierServiceError::DuplicateDocument,
        other => SupplierServiceError::Repository(other),
    }
}
