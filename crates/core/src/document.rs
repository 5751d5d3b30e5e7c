//! Brazilian taxpayer document validation (CPF and CNPJ).
//!
//! Both documents end in two mod-11 check digits. For each check digit the
//! preceding digits are multiplied by a fixed weight sequence and summed;
//! with `r = sum % 11` the digit is `0` when `r < 2` and `11 - r` otherwise.
//! The second check digit is computed over the base digits plus the first
//! check digit.
//!
//! All functions here are pure and total: any `&str` is accepted and invalid
//! input simply yields `false`.
//!
//! ```
//! use catalog_core::document::{validate_cnpj, validate_cpf};
//!
//! assert!(validate_cpf("52998224725"));
//! assert!(!validate_cpf("52998224726"));
//! assert!(validate_cnpj("11222333000181"));
//! assert!(!validate_cnpj("11.222.333/0001-81"));
//! ```

/// Number of digits in a CPF.
pub const CPF_LENGTH: usize = 11;

/// Number of digits in a CNPJ.
pub const CNPJ_LENGTH: usize = 14;

const CPF_FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Returns `true` if `document` is an 11-digit CPF with valid check digits.
///
/// Rejects anything that is not exactly eleven ASCII digits, and the
/// repeated-digit sequences (`00000000000`, `11111111111`, ...) that would
/// otherwise pass the checksum.
#[must_use]
pub fn validate_cpf(document: &str) -> bool {
    checksum_matches(document, &CPF_FIRST_WEIGHTS, &CPF_SECOND_WEIGHTS)
}

/// Returns `true` if `document` is a 14-digit CNPJ with valid check digits.
///
/// Same rules as [`validate_cpf`] with CNPJ weights: exactly fourteen ASCII
/// digits, not all identical, both check digits matching.
#[must_use]
pub fn validate_cnpj(document: &str) -> bool {
    checksum_matches(document, &CNPJ_FIRST_WEIGHTS, &CNPJ_SECOND_WEIGHTS)
}

/// Strip everything but ASCII digits, e.g. `529.982.247-25` -> `52998224725`.
#[must_use]
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Remove the punctuation people type in documents (`.`, `-`, `/` and
/// whitespace). Any other character is kept, so letters still fail
/// validation: `529.982.247-25` -> `52998224725`, `CPF 529` -> `CPF529`.
#[must_use]
pub fn strip_formatting(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '/') && !c.is_whitespace())
        .collect()
}

/// Format an 11-digit CPF as `000.000.000-00`.
///
/// Input that is not exactly eleven ASCII digits is returned unchanged.
#[must_use]
pub fn format_cpf(document: &str) -> String {
    if !is_digits_of_len(document, CPF_LENGTH) {
        return document.to_owned();
    }
    let (a, rest) = document.split_at(3);
    let (b, rest) = rest.split_at(3);
    let (c, d) = rest.split_at(3);
    format!("{a}.{b}.{c}-{d}")
}

/// Format a 14-digit CNPJ as `00.000.000/0000-00`.
///
/// Input that is not exactly fourteen ASCII digits is returned unchanged.
#[must_use]
pub fn format_cnpj(document: &str) -> String {
    if !is_digits_of_len(document, CNPJ_LENGTH) {
        return document.to_owned();
    }
    let (a, rest) = document.split_at(2);
    let (b, rest) = rest.split_at(3);
    let (c, rest) = rest.split_at(3);
    let (d, e) = rest.split_at(4);
    format!("{a}.{b}.{c}/{d}-{e}")
}

/// Format a document as CPF or CNPJ depending on its length.
#[must_use]
pub fn format_document(document: &str) -> String {
    match document.len() {
        CPF_LENGTH => format_cpf(document),
        CNPJ_LENGTH => format_cnpj(document),
        _ => document.to_owned(),
    }
}

fn is_digits_of_len(document: &str, len: usize) -> bool {
    document.len() == len && document.bytes().all(|b| b.is_ascii_digit())
}

/// Shared CPF/CNPJ check. `second.len()` is the index of the second check
/// digit, so the document must be one digit longer than that.
fn checksum_matches(document: &str, first: &[u32], second: &[u32]) -> bool {
    let Some(digits) = parse_digits(document, second.len() + 1) else {
        return false;
    };

    if digits.iter().all(|d| Some(d) == digits.first()) {
        return false;
    }

    digits.get(first.len()) == Some(&check_digit(&digits, first))
        && digits.get(second.len()) == Some(&check_digit(&digits, second))
}

fn parse_digits(document: &str, len: usize) -> Option<Vec<u32>> {
    if document.len() != len {
        return None;
    }
    document.chars().map(|c| c.to_digit(10)).collect()
}

/// Weighted mod-11 check digit over the first `weights.len()` digits.
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = weights.iter().zip(digits).map(|(w, d)| w * d).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CPF: &str = "52998224725";
    const VALID_CNPJ: &str = "11222333000181";

    /// Every string produced by replacing one digit with a different one.
    fn single_digit_mutations(document: &str) -> impl Iterator<Item = String> + '_ {
        (0..document.len()).flat_map(move |pos| {
            let original = document.as_bytes().get(pos).copied();
            (b'0'..=b'9')
                .filter(move |&d| Some(d) != original)
                .map(move |d| {
                    let mut bytes = document.as_bytes().to_vec();
                    if let Some(slot) = bytes.get_mut(pos) {
                        *slot = d;
                    }
                    String::from_utf8_lossy(&bytes).into_owned()
                })
        })
    }

    #[test]
    fn test_cpf_known_valid() {
        assert!(validate_cpf(VALID_CPF));
        assert!(validate_cpf("11144477735"));
    }

    #[test]
    fn test_cpf_corrupted_trailing_digit() {
        assert!(!validate_cpf("52998224726"));
    }

    #[test]
    fn test_cpf_wrong_lengths() {
        for len in 0..=20 {
            if len == CPF_LENGTH {
                continue;
            }
            let candidate: String = VALID_CPF.chars().cycle().take(len).collect();
            assert!(!validate_cpf(&candidate), "length {len} should fail");
        }
    }

    #[test]
    fn test_cpf_repeated_digits() {
        for d in '0'..='9' {
            let repeated: String = std::iter::repeat_n(d, CPF_LENGTH).collect();
            assert!(!validate_cpf(&repeated), "{repeated} should fail");
        }
    }

    #[test]
    fn test_cpf_non_digits() {
        assert!(!validate_cpf("529.982.247-25"));
        assert!(!validate_cpf("5299822472a"));
        assert!(!validate_cpf(" 5299822472"));
    }

    #[test]
    fn test_cpf_non_ascii_does_not_panic() {
        assert!(!validate_cpf("５２９９８２２４７２５"));
        assert!(!validate_cpf("5299822472é"));
    }

    #[test]
    fn test_cpf_single_digit_mutations() {
        for mutated in single_digit_mutations(VALID_CPF) {
            assert!(!validate_cpf(&mutated), "{mutated} should fail");
        }
    }

    #[test]
    fn test_cnpj_known_valid() {
        assert!(validate_cnpj(VALID_CNPJ));
        assert!(validate_cnpj("11444777000161"));
    }

    #[test]
    fn test_cnpj_single_digit_mutations() {
        for mutated in single_digit_mutations(VALID_CNPJ) {
            assert!(!validate_cnpj(&mutated), "{mutated} should fail");
        }
    }

    #[test]
    fn test_cnpj_wrong_lengths() {
        for len in 0..=20 {
            if len == CNPJ_LENGTH {
                continue;
            }
            let candidate: String = VALID_CNPJ.chars().cycle().take(len).collect();
            assert!(!validate_cnpj(&candidate), "length {len} should fail");
        }
    }

    #[test]
    fn test_cnpj_repeated_digits() {
        for d in '0'..='9' {
            let repeated: String = std::iter::repeat_n(d, CNPJ_LENGTH).collect();
            assert!(!validate_cnpj(&repeated));
        }
    }

    #[test]
    fn test_cpf_is_not_a_cnpj() {
        assert!(!validate_cnpj(VALID_CPF));
        assert!(!validate_cpf(VALID_CNPJ));
    }

    #[test]
    fn test_validation_is_idempotent() {
        for doc in [VALID_CPF, "52998224726", VALID_CNPJ, "", "abc"] {
            assert_eq!(validate_cpf(doc), validate_cpf(doc));
            assert_eq!(validate_cnpj(doc), validate_cnpj(doc));
        }
    }

    #[test]
    fn test_check_digit_remainder_below_two_is_zero() {
        // 10 -> r = 10 -> 1
        assert_eq!(check_digit(&[1], &[10]), 1);
        // 11 -> r = 0 -> 0; 12 -> r = 1 -> 0
        assert_eq!(check_digit(&[11], &[1]), 0);
        assert_eq!(check_digit(&[12], &[1]), 0);
    }

    #[test]
    fn test_strip_formatting_keeps_letters() {
        assert_eq!(strip_formatting(" 529.982.247-25 "), VALID_CPF);
        assert_eq!(strip_formatting("11.222.333/0001-81"), VALID_CNPJ);
        assert_eq!(strip_formatting("CPF 52998224725"), "CPF52998224725");
        assert!(!validate_cpf(&strip_formatting("abc529x982y247z25")));
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("529.982.247-25"), VALID_CPF);
        assert_eq!(digits_only("11.222.333/0001-81"), VALID_CNPJ);
        assert_eq!(digits_only("n/a"), "");
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf(VALID_CPF), "529.982.247-25");
        assert_eq!(format_cpf("123"), "123");
    }

    #[test]
    fn test_format_cnpj() {
        assert_eq!(format_cnpj(VALID_CNPJ), "11.222.333/0001-81");
        assert_eq!(format_cnpj("12345678901234x"), "12345678901234x");
    }

    #[test]
    fn test_format_document_picks_by_length() {
        assert_eq!(format_document(VALID_CPF), "529.982.247-25");
        assert_eq!(format_document(VALID_CNPJ), "11.222.333/0001-81");
        assert_eq!(format_document("42"), "42");
    }
}
