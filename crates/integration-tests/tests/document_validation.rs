//! Properties of CPF/CNPJ validation and of the supplier rules built on it.

#![allow(clippy::unwrap_used)]

use catalog_core::document::{
    CNPJ_LENGTH, CPF_LENGTH, digits_only, format_document, validate_cnpj, validate_cpf,
};
use catalog_core::validation::{AddressFields, validate_address, validate_product, validate_supplier};
use catalog_core::{FieldErrorKind, SupplierKind, parse_amount};

const VALID_CPF: &str = "52998224725";
const VALID_CNPJ: &str = "11222333000181";

/// Replace the digit at `index` with the next digit, wrapping 9 to 0.
fn mutate(document: &str, index: usize) -> String {
    document
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i == index {
                char::from_digit((c.to_digit(10).unwrap() + 1) % 10, 10).unwrap()
            } else {
                c
            }
        })
        .collect()
}

#[test]
fn test_known_documents() {
    assert!(validate_cpf(VALID_CPF));
    assert!(!validate_cpf("52998224726"));
    assert!(validate_cnpj(VALID_CNPJ));
    assert!(validate_cpf("12345678909"));
    assert!(validate_cnpj("45678912000155"));
}

#[test]
fn test_cpf_rejects_every_other_length() {
    for len in 0..=20 {
        if len == CPF_LENGTH {
            continue;
        }
        let candidate: String = VALID_CPF.chars().cycle().take(len).collect();
        assert!(!validate_cpf(&candidate), "length {len}");
    }
}

#[test]
fn test_cnpj_rejects_every_other_length() {
    for len in 0..=20 {
        if len == CNPJ_LENGTH {
            continue;
        }
        let candidate: String = VALID_CNPJ.chars().cycle().take(len).collect();
        assert!(!validate_cnpj(&candidate), "length {len}");
    }
}

#[test]
fn test_repeated_digits_rejected() {
    for digit in '0'..='9' {
        assert!(!validate_cpf(&digit.to_string().repeat(CPF_LENGTH)));
        assert!(!validate_cnpj(&digit.to_string().repeat(CNPJ_LENGTH)));
    }
}

#[test]
fn test_any_single_digit_mutation_rejected() {
    for index in 0..CNPJ_LENGTH {
        assert!(!validate_cnpj(&mutate(VALID_CNPJ, index)), "cnpj index {index}");
    }
    for index in 0..CPF_LENGTH {
        assert!(!validate_cpf(&mutate(VALID_CPF, index)), "cpf index {index}");
    }
}

#[test]
fn test_non_digit_and_non_ascii_input() {
    assert!(!validate_cpf("529.982.247-25"));
    assert!(!validate_cpf("5299822472a"));
    assert!(!validate_cpf("５２９９８２２４７２５"));
    assert!(!validate_cnpj("1122233300018é"));
    assert!(!validate_cnpj("🦀🦀🦀🦀🦀🦀🦀"));
}

#[test]
fn test_validation_is_idempotent() {
    for input in [VALID_CPF, "52998224726", VALID_CNPJ, "", "abc"] {
        assert_eq!(validate_cpf(input), validate_cpf(input));
        assert_eq!(validate_cnpj(input), validate_cnpj(input));
    }
}

#[test]
fn test_formatting_round_trips_through_digits_only() {
    assert_eq!(format_document(VALID_CPF), "529.982.247-25");
    assert_eq!(format_document(VALID_CNPJ), "11.222.333/0001-81");
    assert_eq!(digits_only(&format_document(VALID_CNPJ)), VALID_CNPJ);
}

#[test]
fn test_individual_with_cnpj_is_length_error_only() {
    let errors = validate_supplier("Ana Souza", VALID_CNPJ, SupplierKind::Individual);
    let kinds: Vec<_> = errors.for_field("document").map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [FieldErrorKind::ExactLength {
            expected: 11,
            actual: 14
        }]
    );
}

#[test]
fn test_corporate_with_valid_cnpj_passes() {
    assert!(validate_supplier("Acme Ltda", VALID_CNPJ, SupplierKind::Corporate).is_empty());
}

#[test]
fn test_right_length_wrong_checksum() {
    let errors = validate_supplier("Ana Souza", "52998224726", SupplierKind::Individual);
    assert_eq!(
        errors.message_for("document").as_deref(),
        Some("The document provided is invalid.")
    );
}

#[test]
fn test_missing_document_is_length_error() {
    let errors = validate_supplier("Ana Souza", "", SupplierKind::Individual);
    assert_eq!(
        errors.message_for("document").as_deref(),
        Some("The Document field must have 11 characters and 0 were provided.")
    );
}

#[test]
fn test_negative_price_fails() {
    let errors = validate_product("Café", "Grãos torrados", parse_amount("-1,00").unwrap());
    assert!(errors.message_for("price").is_some());
    assert!(
        validate_product("Café", "Grãos torrados", parse_amount("0").unwrap()).is_empty()
    );
}

#[test]
fn test_zip_code_must_have_eight_digits() {
    let address = AddressFields {
        street: "Rua A",
        number: "10",
        complement: None,
        zip_code: "0131010",
        neighborhood: "Centro",
        city: "Recife",
        state: "PE",
    };
    assert!(validate_address(&address).message_for("zip_code").is_some());

    let address = AddressFields {
        zip_code: "01310100",
        ..address
    };
    assert!(validate_address(&address).is_empty());
}
