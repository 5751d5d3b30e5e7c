//! Catalog Core - shared types and validation rules.
//!
//! Used by:
//! - `admin` - the catalog web application
//! - `cli` - command-line tools for migrations, users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Database encoding for the newtypes is available
//! behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`document`] - CPF and CNPJ checksum validation and formatting
//! - [`validation`] - field rules for suppliers, addresses and products
//! - [`types`] - type-safe IDs, email, price, supplier kind and claims

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod document;
pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldError, FieldErrorKind, ValidationErrors};
