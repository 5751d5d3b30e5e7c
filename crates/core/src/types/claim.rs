//! Permission claims granted to users.
//!
//! A claim pairs a resource with an action and is written `resource:action`,
//! e.g. `supplier:add` or `product:delete`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Claim`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimParseError {
    #[error("claim must look like `resource:action`, got `{0}`")]
    Malformed(String),
    #[error("unknown claim resource `{0}`")]
    UnknownResource(String),
    #[error("unknown claim action `{0}`")]
    UnknownAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClaimResource {
    Supplier,
    Product,
}

impl ClaimResource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supplier => "supplier",
            Self::Product => "product",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClaimAction {
    Add,
    Edit,
    Delete,
}

impl ClaimAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// A single permission, e.g. "may edit suppliers".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Claim {
    pub resource: ClaimResource,
    pub action: ClaimAction,
}

impl Claim {
    pub const SUPPLIER_ADD: Self = Self::new(ClaimResource::Supplier, ClaimAction::Add);
    pub const SUPPLIER_EDIT: Self = Self::new(ClaimResource::Supplier, ClaimAction::Edit);
    pub const SUPPLIER_DELETE: Self = Self::new(ClaimResource::Supplier, ClaimAction::Delete);
    pub const PRODUCT_ADD: Self = Self::new(ClaimResource::Product, ClaimAction::Add);
    pub const PRODUCT_EDIT: Self = Self::new(ClaimResource::Product, ClaimAction::Edit);
    pub const PRODUCT_DELETE: Self = Self::new(ClaimResource::Product, ClaimAction::Delete);

    /// Every claim the application knows about.
    pub const ALL: [Self; 6] = [
        Self::SUPPLIER_ADD,
        Self::SUPPLIER_EDIT,
        Self::SUPPLIER_DELETE,
        Self::PRODUCT_ADD,
        Self::PRODUCT_EDIT,
        Self::PRODUCT_DELETE,
    ];

    #[must_use]
    pub const fn new(resource: ClaimResource, action: ClaimAction) -> Self {
        Self { resource, action }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

impl FromStr for Claim {
    type Err = ClaimParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ClaimParseError::Malformed(s.to_owned()))?;

        let resource = match resource.to_ascii_lowercase().as_str() {
            "supplier" => ClaimResource::Supplier,
            "product" => ClaimResource::Product,
            other => return Err(ClaimParseError::UnknownResource(other.to_owned())),
        };
        let action = match action.to_ascii_lowercase().as_str() {
            "add" => ClaimAction::Add,
            "edit" => ClaimAction::Edit,
            "delete" => ClaimAction::Delete,
            other => return Err(ClaimParseError::UnknownAction(other.to_owned())),
        };

        Ok(Self::new(resource, action))
    }
}

impl TryFrom<String> for Claim {
    type Error = ClaimParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Claim> for String {
    fn from(claim: Claim) -> Self {
        claim.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Claim::SUPPLIER_ADD.to_string(), "supplier:add");
        assert_eq!(Claim::PRODUCT_DELETE.to_string(), "product:delete");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Product:Edit".parse::<Claim>().unwrap(), Claim::PRODUCT_EDIT);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "supplier".parse::<Claim>(),
            Err(ClaimParseError::Malformed(_))
        ));
        assert!(matches!(
            "order:add".parse::<Claim>(),
            Err(ClaimParseError::UnknownResource(_))
        ));
        assert!(matches!(
            "supplier:approve".parse::<Claim>(),
            Err(ClaimParseError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_all_claims_parse_back() {
        for claim in Claim::ALL {
            assert_eq!(claim.to_string().parse::<Claim>().unwrap(), claim);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&vec![Claim::SUPPLIER_EDIT]).unwrap();
        assert_eq!(json, r#"["supplier:edit"]"#);
        let back: Vec<Claim> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Claim::SUPPLIER_EDIT]);
    }
}
