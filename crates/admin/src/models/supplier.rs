//! Supplier domain types.

use chrono::{DateTime, Utc};

use catalog_core::validation::validate_supplier;
use catalog_core::{SupplierId, SupplierKind, ValidationErrors};

use super::{Address, Product};

/// A supplier of products, identified by CPF or CNPJ.
#[derive(Debug, Clone)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    /// Digits only; 11 for individuals, 14 for companies.
    pub document: String,
    pub kind: SupplierKind,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A supplier together with its address and products.
#[derive(Debug, Clone)]
pub struct SupplierDetails {
    pub supplier: Supplier,
    pub address: Option<Address>,
    pub products: Vec<Product>,
}

/// User-supplied supplier fields, normalized but not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierInput {
    pub name: String,
    pub document: String,
    pub kind: SupplierKind,
    pub active: bool,
}

impl SupplierInput {
    /// Trim the name and strip document punctuation. Letters and other
    /// symbols are kept so that validation rejects them.
    #[must_use]
    pub fn new(name: &str, document: &str, kind: SupplierKind, active: bool) -> Self {
        Self {
            name: name.trim().to_owned(),
            document: catalog_core::document::strip_formatting(document),
            kind,
            active,
        }
    }

    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        validate_supplier(&self.name, &self.document, self.kind)
    }
}
