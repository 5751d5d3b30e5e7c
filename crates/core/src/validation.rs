//! Field validation for suppliers, addresses and products.
//!
//! Validators never fail fast: every broken rule is collected into
//! [`ValidationErrors`] so a form can show all of them at once.

use core::fmt;

use rust_decimal::Decimal;

use crate::document::{validate_cnpj, validate_cpf};
use crate::types::SupplierKind;

pub const SUPPLIER_NAME_LENGTH: (usize, usize) = (2, 100);
pub const PRODUCT_NAME_LENGTH: (usize, usize) = (2, 200);
pub const PRODUCT_DESCRIPTION_LENGTH: (usize, usize) = (2, 1000);
pub const STREET_LENGTH: (usize, usize) = (2, 200);
pub const NUMBER_LENGTH: (usize, usize) = (1, 50);
pub const NEIGHBORHOOD_LENGTH: (usize, usize) = (2, 100);
pub const CITY_LENGTH: (usize, usize) = (2, 100);
pub const STATE_LENGTH: (usize, usize) = (2, 50);
pub const COMPLEMENT_MAX_LENGTH: usize = 250;
pub const ZIP_CODE_LENGTH: usize = 8;

/// What went wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Empty or whitespace-only.
    Required,
    /// Character count outside `[min, max]`.
    Length { min: usize, max: usize },
    /// Character count must be exactly `expected`.
    ExactLength { expected: usize, actual: usize },
    /// Right length, but the check digits do not match.
    Checksum,
    /// Below zero.
    Negative,
}

/// A broken rule on a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field key, e.g. `document`.
    pub field: &'static str,
    /// Label shown to the user, e.g. `Document`.
    pub label: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    #[must_use]
    pub const fn new(field: &'static str, label: &'static str, kind: FieldErrorKind) -> Self {
        Self { field, label, kind }
    }

    #[must_use]
    pub fn message(&self) -> String {
        let label = self.label;
        match self.kind {
            FieldErrorKind::Required => format!("The {label} field is required."),
            FieldErrorKind::Length { min, max } => {
                format!("The {label} field must be between {min} and {max} characters.")
            }
            FieldErrorKind::ExactLength { expected, actual } => format!(
                "The {label} field must have {expected} characters and {actual} were provided."
            ),
            FieldErrorKind::Checksum => "The document provided is invalid.".to_owned(),
            FieldErrorKind::Negative => format!("The {label} field cannot be negative."),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Every rule broken by one input, in the order the rules ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Errors for one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.0.iter().filter(move |e| e.field == field)
    }

    /// First message for a field, for rendering next to the input.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<String> {
        self.for_field(field).next().map(FieldError::message)
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(FieldError::message).collect()
    }

    /// `Ok(())` when nothing was collected.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one rule was broken.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join(" "))
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validate supplier fields.
///
/// The document rule depends on `kind`: an individual needs an 11-digit CPF,
/// a company a 14-digit CNPJ. A document of the wrong length yields only an
/// [`FieldErrorKind::ExactLength`] error; the checksum is checked only once
/// the length is right. An empty document is a length mismatch with
/// `actual == 0`.
#[must_use]
pub fn validate_supplier(name: &str, document: &str, kind: SupplierKind) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    require_length(&mut errors, "name", "Name", name, SUPPLIER_NAME_LENGTH);

    let expected = kind.document_length();
    let actual = document.chars().count();
    if actual != expected {
        errors.push(FieldError::new(
            "document",
            "Document",
            FieldErrorKind::ExactLength { expected, actual },
        ));
    } else if !document_checksum_ok(document, kind) {
        errors.push(FieldError::new(
            "document",
            "Document",
            FieldErrorKind::Checksum,
        ));
    }

    errors
}

fn document_checksum_ok(document: &str, kind: SupplierKind) -> bool {
    match kind {
        SupplierKind::Individual => validate_cpf(document),
        SupplierKind::Corporate => validate_cnpj(document),
    }
}

/// Borrowed view of an address form.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressFields<'a> {
    pub street: &'a str,
    pub number: &'a str,
    pub complement: Option<&'a str>,
    pub zip_code: &'a str,
    pub neighborhood: &'a str,
    pub city: &'a str,
    pub state: &'a str,
}

/// Validate address fields.
#[must_use]
pub fn validate_address(address: &AddressFields<'_>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    require_length(&mut errors, "street", "Street", address.street, STREET_LENGTH);
    require_length(&mut errors, "number", "Number", address.number, NUMBER_LENGTH);

    if let Some(complement) = address.complement
        && complement.chars().count() > COMPLEMENT_MAX_LENGTH
    {
        errors.push(FieldError::new(
            "complement",
            "Complement",
            FieldErrorKind::Length {
                min: 0,
                max: COMPLEMENT_MAX_LENGTH,
            },
        ));
    }

    if address.zip_code.trim().is_empty() {
        errors.push(FieldError::new(
            "zip_code",
            "Zip code",
            FieldErrorKind::Required,
        ));
    } else {
        let actual = address.zip_code.chars().count();
        if actual != ZIP_CODE_LENGTH {
            errors.push(FieldError::new(
                "zip_code",
                "Zip code",
                FieldErrorKind::ExactLength {
                    expected: ZIP_CODE_LENGTH,
                    actual,
                },
            ));
        }
    }

    require_length(
        &mut errors,
        "neighborhood",
        "Neighborhood",
        address.neighborhood,
        NEIGHBORHOOD_LENGTH,
    );
    require_length(&mut errors, "city", "City", address.city, CITY_LENGTH);
    require_length(&mut errors, "state", "State", address.state, STATE_LENGTH);

    errors
}

/// Validate product fields.
#[must_use]
pub fn validate_product(name: &str, description: &str, price: Decimal) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    require_length(&mut errors, "name", "Name", name, PRODUCT_NAME_LENGTH);
    require_length(
        &mut errors,
        "description",
        "Description",
        description,
        PRODUCT_DESCRIPTION_LENGTH,
    );

    if price.is_sign_negative() && !price.is_zero() {
        errors.push(FieldError::new("price", "Price", FieldErrorKind::Negative));
    }

    errors
}

/// Required field whose character count must fall in `[min, max]`.
fn require_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    label: &'static str,
    value: &str,
    (min, max): (usize, usize),
) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, label, FieldErrorKind::Required));
        return;
    }

    let len = value.chars().count();
    if len < min || len > max {
        errors.push(FieldError::new(
            field,
            label,
            FieldErrorKind::Length { min, max },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CPF: &str = "52998224725";
    const VALID_CNPJ: &str = "11222333000181";

    fn address() -> AddressFields<'static> {
        AddressFields {
            street: "Rua das Flores",
            number: "120",
            complement: Some("Sala 4"),
            zip_code: "01310100",
            neighborhood: "Bela Vista",
            city: "São Paulo",
            state: "SP",
        }
    }

    #[test]
    fn test_valid_individual_supplier() {
        assert!(validate_supplier("Maria Silva", VALID_CPF, SupplierKind::Individual).is_empty());
    }

    #[test]
    fn test_valid_corporate_supplier() {
        assert!(validate_supplier("Acme Ltda", VALID_CNPJ, SupplierKind::Corporate).is_empty());
    }

    #[test]
    fn test_individual_with_cnpj_length_reports_length_not_checksum() {
        let errors = validate_supplier("Maria Silva", VALID_CNPJ, SupplierKind::Individual);
        let kinds: Vec<_> = errors.for_field("document").map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![FieldErrorKind::ExactLength {
                expected: 11,
                actual: 14
            }]
        );
        assert_eq!(
            errors.message_for("document").as_deref(),
            Some("The Document field must have 11 characters and 14 were provided.")
        );
    }

    #[test]
    fn test_corporate_with_cpf_length_reports_length() {
        let errors = validate_supplier("Acme Ltda", VALID_CPF, SupplierKind::Corporate);
        assert_eq!(
            errors.for_field("document").next().map(|e| e.kind),
            Some(FieldErrorKind::ExactLength {
                expected: 14,
                actual: 11
            })
        );
    }

    #[test]
    fn test_bad_checksum_reports_checksum() {
        let errors = validate_supplier("Maria Silva", "52998224726", SupplierKind::Individual);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.message_for("document").as_deref(),
            Some("The document provided is invalid.")
        );
    }

    #[test]
    fn test_empty_document_is_length_mismatch() {
        let errors = validate_supplier("Acme Ltda", "", SupplierKind::Corporate);
        assert_eq!(
            errors.for_field("document").next().map(|e| e.kind),
            Some(FieldErrorKind::ExactLength {
                expected: 14,
                actual: 0
            })
        );
    }

    #[test]
    fn test_name_rules() {
        let missing = validate_supplier("  ", VALID_CPF, SupplierKind::Individual);
        assert_eq!(
            missing.for_field("name").next().map(|e| e.kind),
            Some(FieldErrorKind::Required)
        );

        let short = validate_supplier("A", VALID_CPF, SupplierKind::Individual);
        assert_eq!(
            short.message_for("name").as_deref(),
            Some("The Name field must be between 2 and 100 characters.")
        );

        let long = "x".repeat(101);
        assert!(!validate_supplier(&long, VALID_CPF, SupplierKind::Individual).is_empty());
        let max = "x".repeat(100);
        assert!(validate_supplier(&max, VALID_CPF, SupplierKind::Individual).is_empty());
    }

    #[test]
    fn test_name_length_counts_characters() {
        // 50 two-byte characters
        let accented = "é".repeat(50);
        assert!(validate_supplier(&accented, VALID_CPF, SupplierKind::Individual).is_empty());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let errors = validate_supplier("", "123", SupplierKind::Individual);
        assert_eq!(errors.len(), 2);
        assert!(errors.clone().into_result().is_err());
    }

    #[test]
    fn test_supplier_validation_is_idempotent() {
        let first = validate_supplier("Acme", "11222333000180", SupplierKind::Corporate);
        let second = validate_supplier("Acme", "11222333000180", SupplierKind::Corporate);
        assert_eq!(first, second);
    }

    #[test]
    fn test_valid_address() {
        assert!(validate_address(&address()).is_empty());
        let no_complement = AddressFields {
            complement: None,
            ..address()
        };
        assert!(validate_address(&no_complement).is_empty());
    }

    #[test]
    fn test_address_zip_code_length() {
        let fields = AddressFields {
            zip_code: "0131010",
            ..address()
        };
        let errors = validate_address(&fields);
        assert_eq!(
            errors.message_for("zip_code").as_deref(),
            Some("The Zip code field must have 8 characters and 7 were provided.")
        );
    }

    #[test]
    fn test_address_required_fields() {
        let errors = validate_address(&AddressFields::default());
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["street", "number", "zip_code", "neighborhood", "city", "state"]
        );
        assert!(errors.iter().all(|e| e.kind == FieldErrorKind::Required));
    }

    #[test]
    fn test_address_complement_too_long() {
        let long = "c".repeat(COMPLEMENT_MAX_LENGTH + 1);
        let fields = AddressFields {
            complement: Some(&long),
            ..address()
        };
        assert!(validate_address(&fields).message_for("complement").is_some());
    }

    #[test]
    fn test_valid_product() {
        assert!(validate_product("Café", "Torra média", Decimal::new(1990, 2)).is_empty());
        assert!(validate_product("Brinde", "Sem custo", Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_product_negative_price() {
        let errors = validate_product("Café", "Torra média", Decimal::new(-1, 2));
        assert_eq!(
            errors.message_for("price").as_deref(),
            Some("The Price field cannot be negative.")
        );
    }

    #[test]
    fn test_product_description_bounds() {
        let long = "d".repeat(1001);
        let errors = validate_product("Café", &long, Decimal::ONE);
        assert_eq!(
            errors.for_field("description").next().map(|e| e.kind),
            Some(FieldErrorKind::Length { min: 2, max: 1000 })
        );
    }

    #[test]
    fn test_display_joins_messages() {
        let errors = validate_product("", "", Decimal::ONE);
        assert_eq!(
            errors.to_string(),
            "The Name field is required. The Description field is required."
        );
    }
}
