//! Supplier kind, selecting which document rule set applies.

use serde::{Deserialize, Serialize};

use crate::document::{CNPJ_LENGTH, CPF_LENGTH};

/// Whether a supplier is a natural person (CPF) or a company (CNPJ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "catalog.supplier_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SupplierKind {
    /// Natural person, identified by an 11-digit CPF.
    Individual,
    /// Company, identified by a 14-digit CNPJ.
    Corporate,
}

impl SupplierKind {
    pub const ALL: [Self; 2] = [Self::Individual, Self::Corporate];

    /// Number of digits the document must have for this kind.
    #[must_use]
    pub const fn document_length(self) -> usize {
        match self {
            Self::Individual => CPF_LENGTH,
            Self::Corporate => CNPJ_LENGTH,
        }
    }

    /// Name of the document this kind is identified by.
    #[must_use]
    pub const fn document_label(self) -> &'static str {
        match self {
            Self::Individual => "CPF",
            Self::Corporate => "CNPJ",
        }
    }

    /// Human-readable label for forms and listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Corporate => "Corporate",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Corporate => "corporate",
        }
    }
}

impl std::fmt::Display for SupplierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SupplierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(Self::Individual),
            "corporate" => Ok(Self::Corporate),
            _ => Err(format!("invalid supplier kind: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_length_per_kind() {
        assert_eq!(SupplierKind::Individual.document_length(), 11);
        assert_eq!(SupplierKind::Corporate.document_length(), 14);
    }

    #[test]
    fn test_string_round_trip() {
        for kind in SupplierKind::ALL {
            assert_eq!(kind.to_string().parse::<SupplierKind>(), Ok(kind));
        }
        assert!("company".parse::<SupplierKind>().is_err());
    }
}
