//! Domain types shared by the catalog crates.

pub mod claim;
pub mod email;
pub mod id;
pub mod price;
pub mod supplier_kind;

pub use claim::{Claim, ClaimAction, ClaimParseError, ClaimResource};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError, parse_amount};
pub use supplier_kind::SupplierKind;
