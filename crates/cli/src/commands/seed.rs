//! Seed suppliers, addresses and products from a YAML file.
//!
//! Everything goes through the same services as the web forms, so a seed
//! file with an invalid CPF/CNPJ or price is rejected the same way a form
//! would be. Suppliers whose document is already registered are skipped.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use catalog_admin::config::DEFAULT_UPLOAD_DIR;
use catalog_admin::models::{AddressInput, ProductInput, SupplierInput};
use catalog_admin::services::{
    ImageStore, ImageUpload, ProductService, ProductServiceError, SupplierService,
    SupplierServiceError,
};
use catalog_core::{PriceError, SupplierKind, parse_amount};

use super::{CommandError, connect};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Supplier {name}: {source}")]
    Supplier {
        name: String,
        source: SupplierServiceError,
    },

    #[error("Product {name}: {source}")]
    Product {
        name: String,
        source: ProductServiceError,
    },

    #[error("Product {name}: {source}")]
    Price { name: String, source: PriceError },
}

/// Root of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub suppliers: Vec<SeedSupplier>,
}

#[derive(Debug, Deserialize)]
pub struct SeedSupplier {
    pub name: String,
    /// CPF or CNPJ, punctuation allowed.
    pub document: String,
    pub kind: SupplierKind,
    #[serde(default = "active_by_default")]
    pub active: bool,
    pub address: SeedAddress,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAddress {
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub zip_code: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub description: String,
    /// Same formats the product form accepts, e.g. `"42,90"`.
    pub price: String,
    /// Image path, relative to the seed file.
    pub image: PathBuf,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

const fn active_by_default() -> bool {
    true
}

impl SeedSupplier {
    fn supplier_input(&self) -> SupplierInput {
        SupplierInput::new(&self.name, &self.document, self.kind, self.active)
    }
}

impl From<&SeedAddress> for AddressInput {
    fn from(address: &SeedAddress) -> Self {
        Self {
            street: address.street.clone(),
            number: address.number.clone(),
            complement: address.complement.clone(),
            zip_code: address.zip_code.clone(),
            neighborhood: address.neighborhood.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub suppliers_added: usize,
    pub suppliers_skipped: usize,
    pub products_added: usize,
}

/// Parse a seed file without touching the database.
///
/// # Errors
///
/// Returns `SeedError::Yaml` if the content does not match the format.
pub fn parse(content: &str) -> Result<SeedFile, SeedError> {
    Ok(serde_yaml::from_str(content)?)
}

async fn read(path: &Path) -> Result<Vec<u8>, SeedError> {
    tokio::fs::read(path).await.map_err(|source| SeedError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Load `file_path` into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the database is
/// unreachable, or any supplier or product is rejected.
pub async fn run(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    info!(path = %path.display(), "Loading seed file");

    let content = read(path).await?;
    let seed = parse(&String::from_utf8_lossy(&content))?;
    info!(suppliers = seed.suppliers.len(), "Parsed seed file");

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let upload_dir = std::env::var("CATALOG_UPLOAD_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_owned());
    let images = ImageStore::new(upload_dir);

    let pool = connect().await?;
    let suppliers = SupplierService::new(&pool);
    let products = ProductService::new(&pool, &images);

    let mut summary = SeedSummary::default();

    for entry in &seed.suppliers {
        let supplier = match suppliers
            .add(entry.supplier_input(), AddressInput::from(&entry.address))
            .await
        {
            Ok(supplier) => supplier,
            Err(SupplierServiceError::DuplicateDocument) => {
                warn!(name = %entry.name, "Supplier already registered, skipping");
                summary.suppliers_skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(SeedError::Supplier {
                    name: entry.name.clone(),
                    source,
                });
            }
        };
        summary.suppliers_added += 1;

        for product in &entry.products {
            let price = parse_amount(&product.price).map_err(|source| SeedError::Price {
                name: product.name.clone(),
                source,
            })?;
            let image_path = base_dir.join(&product.image);
            let upload = ImageUpload {
                file_name: product
                    .image
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                bytes: read(&image_path).await?,
            };

            let input = ProductInput {
                supplier_id: supplier.id,
                name: product.name.clone(),
                description: product.description.clone(),
                price,
                active: product.active,
            };

            products
                .add(input, Some(upload))
                .await
                .map_err(|source| SeedError::Product {
                    name: product.name.clone(),
                    source,
                })?;
            summary.products_added += 1;
        }
    }

    info!("Seeding complete!");
    info!("  Suppliers added: {}", summary.suppliers_added);
    info!("  Suppliers skipped (already exist): {}", summary.suppliers_skipped);
    info!("  Products added: {}", summary.products_added);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../../../seed/catalog.yaml");

    #[test]
    fn test_sample_seed_parses() {
        let seed = parse(SAMPLE).unwrap();
        assert_eq!(seed.suppliers.len(), 4);
        assert!(seed.suppliers.iter().any(|s| !s.active));
    }

    #[test]
    fn test_sample_seed_passes_validation() {
        let seed = parse(SAMPLE).unwrap();
        for supplier in &seed.suppliers {
            let errors = supplier.supplier_input().validate();
            assert!(errors.is_empty(), "{}: {errors}", supplier.name);

            let address = AddressInput::from(&supplier.address).normalized();
            let errors = address.validate();
            assert!(errors.is_empty(), "{}: {errors}", supplier.name);

            for product in &supplier.products {
                assert!(parse_amount(&product.price).is_ok(), "{}", product.name);
            }
        }
    }

    #[test]
    fn test_missing_kind_is_rejected() {
        let result = parse(
            "suppliers:\n  - name: Acme\n    document: '11222333000181'\n    address:\n      street: Rua A\n      number: '1'\n      zip_code: '01310100'\n      neighborhood: Centro\n      city: Recife\n      state: PE\n",
        );
        assert!(matches!(result, Err(SeedError::Yaml(_))));
    }

    #[test]
    fn test_defaults() {
        let seed = parse(
            "suppliers:\n  - name: Ana Souza\n    document: '52998224725'\n    kind: individual\n    address:\n      street: Rua A\n      number: '1'\n      zip_code: '01310100'\n      neighborhood: Centro\n      city: Recife\n      state: PE\n",
        )
        .unwrap();
        let supplier = seed.suppliers.first().unwrap();
        assert!(supplier.active);
        assert!(supplier.products.is_empty());
        assert_eq!(supplier.address.complement, None);
    }
}
