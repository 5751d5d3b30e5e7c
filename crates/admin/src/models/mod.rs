//! Domain models for the catalog application.

pub mod address;
pub mod product;
pub mod session;
pub mod supplier;
pub mod user;

pub use address::{Address, AddressInput};
pub use product::{Product, ProductInput, ProductWithSupplier};
pub use session::{CurrentUser, Viewer, keys as session_keys};
pub use supplier::{Supplier, SupplierDetails, SupplierInput};
pub use user::User;
