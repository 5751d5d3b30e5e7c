//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use catalog_core::document::format_document;

/// Format a stored CPF or CNPJ for display.
///
/// Usage in templates: `{{ supplier.document|document }}`
#[askama::filter_fn]
pub fn document(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_document(&value.to_string()))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
