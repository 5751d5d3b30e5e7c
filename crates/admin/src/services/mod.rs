//! Business logic services for the catalog.
//!
//! # Services
//!
//! - `auth` - Password authentication, user creation and claim grants
//! - `suppliers` - Supplier and address rules
//! - `products` - Product rules and image lifecycle
//! - `uploads` - Product image storage

pub mod auth;
pub mod products;
pub mod suppliers;
pub mod uploads;

pub use auth::{AuthError, AuthService};
pub use products::{ImageUpload, ProductService, ProductServiceError};
pub use suppliers::{SupplierService, SupplierServiceError};
pub use uploads::{ImageStore, UploadError};
