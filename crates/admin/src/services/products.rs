//! Product business rules and image handling.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;

use catalog_core::{FieldError, FieldErrorKind, Price, ProductId, ValidationErrors};

use super::uploads::{ImageStore, UploadError};
use crate::db::{ProductRepository, RepositoryError, SupplierRepository};
use crate::models::{Product, ProductInput};

/// An uploaded image, as read from the multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Errors from product operations.
#[derive(Debug, Error)]
pub enum ProductServiceError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("product not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ProductServiceError {
    /// Messages to show on the form, or `None` for infrastructure failures.
    #[must_use]
    pub fn notifications(&self) -> Option<Vec<String>> {
        match self {
            Self::Validation(errors) => Some(errors.messages()),
            Self::Upload(e) if e.is_user_error() => Some(vec![e.to_string()]),
            Self::Upload(_) | Self::NotFound | Self::Repository(_) => None,
        }
    }
}

/// Product service.
pub struct ProductService<'a> {
    products: ProductRepository<'a>,
    suppliers: SupplierRepository<'a>,
    images: &'a ImageStore,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, images: &'a ImageStore) -> Self {
        Self {
            products: ProductRepository::new(pool),
            suppliers: SupplierRepository::new(pool),
            images,
        }
    }

    /// Create a product. An image is required.
    ///
    /// The image is written before the row; if the insert fails the file is
    /// removed again.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::Validation` for broken rules (including
    /// a missing image or unknown supplier) and `Upload` if the image cannot
    /// be stored.
    #[tracing::instrument(skip_all, fields(supplier_id = %input.supplier_id))]
    pub async fn add(
        &self,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<Product, ProductServiceError> {
        let mut errors = self.validate(&input).await?;
        if image.is_none() {
            errors.push(FieldError::new("image", "Image", FieldErrorKind::Required));
        }
        errors
            .into_result()
            .map_err(ProductServiceError::Validation)?;

        let Some(image) = image else {
            return Err(ProductServiceError::Validation(ValidationErrors::new()));
        };
        let price = to_price(input.price)?;
        let stored = self.images.save(&image.file_name, &image.bytes).await?;

        let product = Product {
            id: ProductId::new_v4(),
            supplier_id: input.supplier_id,
            name: input.name,
            description: input.description,
            image: stored,
            price,
            active: input.active,
            created_at: Utc::now(),
        };

        if let Err(e) = self.products.insert(&product).await {
            self.discard_image(&product.image).await;
            return Err(e.into());
        }

        tracing::info!(product_id = %product.id, "Product added");
        Ok(product)
    }

    /// Update a product. Without a new image the current one is kept.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::NotFound` if the product doesn't exist,
    /// `Validation` for broken rules, and `Upload` if the new image cannot
    /// be stored.
    #[tracing::instrument(skip(self, input, image))]
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<Product, ProductServiceError> {
        let current = self
            .products
            .get_with_supplier(id)
            .await?
            .ok_or(ProductServiceError::NotFound)?
            .product;

        self.validate(&input)
            .await?
            .into_result()
            .map_err(ProductServiceError::Validation)?;

        let price = to_price(input.price)?;
        let new_image = match image {
            Some(image) => Some(self.images.save(&image.file_name, &image.bytes).await?),
            None => None,
        };

        let product = Product {
            id,
            supplier_id: input.supplier_id,
            name: input.name,
            description: input.description,
            image: new_image.clone().unwrap_or_else(|| current.image.clone()),
            price,
            active: input.active,
            created_at: current.created_at,
        };

        if let Err(e) = self.products.update(&product).await {
            if let Some(stored) = &new_image {
                self.discard_image(stored).await;
            }
            return Err(match e {
                RepositoryError::NotFound => ProductServiceError::NotFound,
                other => other.into(),
            });
        }

        if new_image.is_some() {
            self.discard_image(&current.image).await;
        }

        tracing::info!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Delete a product and its image.
    ///
    /// # Errors
    ///
    /// Returns `ProductServiceError::NotFound` if the product doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: ProductId) -> Result<(), ProductServiceError> {
        let product = self
            .products
            .get_with_supplier(id)
            .await?
            .ok_or(ProductServiceError::NotFound)?
            .product;

        self.products.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => ProductServiceError::NotFound,
            other => other.into(),
        })?;

        self.discard_image(&product.image).await;
        tracing::info!(product_id = %id, "Product removed");
        Ok(())
    }

    /// Field rules plus the supplier existence check.
    async fn validate(&self, input: &ProductInput) -> Result<ValidationErrors, RepositoryError> {
        let mut errors = input.validate();
        if self.suppliers.get(input.supplier_id).await?.is_none() {
            errors.push(FieldError::new(
                "supplier_id",
                "Supplier",
                FieldErrorKind::Required,
            ));
        }
        Ok(errors)
    }

    async fn discard_image(&self, stored: &str) {
        if let Err(e) = self.images.remove(stored).await {
            tracing::warn!(file = %stored, error = %e, "Failed to remove product image");
        }
    }
}

fn to_price(amount: rust_decimal::Decimal) -> Result<Price, ProductServiceError> {
    Price::new(amount).map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::new("price", "Price", FieldErrorKind::Negative));
        ProductServiceError::Validation(errors)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_to_price_rounds_and_rejects_negative() {
        let price = to_price(Decimal::new(123_456, 4)).unwrap();
        assert_eq!(price.amount(), Decimal::new(1235, 2));
        assert!(matches!(
            to_price(Decimal::new(-1, 2)),
            Err(ProductServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_upload_notifications() {
        let err = ProductServiceError::Upload(UploadError::AlreadyExists);
        assert_eq!(
            err.notifications().unwrap(),
            vec!["A file with this name already exists!".to_owned()]
        );
        let err = ProductServiceError::Upload(UploadError::Io(std::io::Error::other("disk")));
        assert!(err.notifications().is_none());
    }
}
