//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use catalog_core::validation::validate_product;
use catalog_core::{Price, ProductId, SupplierId, ValidationErrors};

/// A product offered by a supplier.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub supplier_id: SupplierId,
    pub name: String,
    pub description: String,
    /// File name under the upload directory.
    pub image: String,
    pub price: Price,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A product joined with the name of its supplier, for listings.
#[derive(Debug, Clone)]
pub struct ProductWithSupplier {
    pub product: Product,
    pub supplier_name: String,
}

/// User-supplied product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub supplier_id: SupplierId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub active: bool,
}

impl ProductInput {
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        validate_product(&self.name, &self.description, self.price)
    }
}
