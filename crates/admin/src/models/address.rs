//! Supplier address domain types.

use catalog_core::validation::{AddressFields, validate_address};
use catalog_core::{AddressId, SupplierId, ValidationErrors};

/// The single postal address of a supplier.
#[derive(Debug, Clone)]
pub struct Address {
    pub id: AddressId,
    pub supplier_id: SupplierId,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    /// Brazilian CEP, 8 digits.
    pub zip_code: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// User-supplied address fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressInput {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub zip_code: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl AddressInput {
    /// Trim every field, drop an empty complement and strip the zip code
    /// punctuation (`01310-100` becomes `01310100`).
    #[must_use]
    pub fn normalized(self) -> Self {
        let zip = self.zip_code.trim();
        let zip_code = if zip.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '.') {
            catalog_core::document::digits_only(zip)
        } else {
            zip.to_owned()
        };

        Self {
            street: self.street.trim().to_owned(),
            number: self.number.trim().to_owned(),
            complement: self
                .complement
                .map(|c| c.trim().to_owned())
                .filter(|c| !c.is_empty()),
            zip_code,
            neighborhood: self.neighborhood.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
        }
    }

    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        validate_address(&AddressFields {
            street: &self.street,
            number: &self.number,
            complement: self.complement.as_deref(),
            zip_code: &self.zip_code,
            neighborhood: &self.neighborhood,
            city: &self.city,
            state: &self.state,
        })
    }
}

impl From<&Address> for AddressInput {
    fn from(address: &Address) -> Self {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            street: " Av. Paulista ".to_owned(),
            number: "1000".to_owned(),
            complement: Some("   ".to_owned()),
            zip_code: "01310-100".to_owned(),
            neighborhood: "Bela Vista".to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
        }
    }

    #[test]
    fn test_normalized() {
        let address = input().normalized();
        assert_eq!(address.street, "Av. Paulista");
        assert_eq!(address.zip_code, "01310100");
        assert_eq!(address.complement, None);
        assert!(address.validate().is_empty());
    }

    #[test]
    fn test_normalized_keeps_malformed_zip_for_error_message() {
        let address = AddressInput {
            zip_code: "CEP 01310".to_owned(),
            ..input()
        }
        .normalized();
        assert_eq!(address.zip_code, "CEP 01310");
        assert!(address.validate().message_for("zip_code").is_some());
    }
}
