//! Types stored in the session.

use serde::{Deserialize, Serialize};

use catalog_core::{Claim, Email, UserId};

use super::User;

/// Session-stored identity of the signed-in user.
///
/// Claims are captured at login; changes made with the CLI apply on the
/// next sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub claims: Vec<Claim>,
}

impl CurrentUser {
    #[must_use]
    pub fn new(user: &User, claims: Vec<Claim>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            claims,
        }
    }

    #[must_use]
    pub fn has_claim(&self, claim: Claim) -> bool {
        self.claims.contains(&claim)
    }
}

/// The requesting user as seen by templates.
///
/// Wraps the optional session user so pages can ask `viewer.can("supplier:edit")`.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user: Option<CurrentUser>,
}

impl Viewer {
    #[must_use]
    pub const fn new(user: Option<CurrentUser>) -> Self {
        Self { user }
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the signed-in user holds the claim written as `resource:action`.
    #[must_use]
    pub fn can(&self, claim: &str) -> bool {
        match (&self.user, claim.parse::<Claim>()) {
            (Some(user), Ok(claim)) => user.has_claim(claim),
            _ => false,
        }
    }
}

impl From<CurrentUser> for Viewer {
    fn from(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in [`CurrentUser`](super::CurrentUser).
    pub const CURRENT_USER: &str = "current_user";

    /// One-shot success message shown on the next page.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_has_claim() {
        let user = CurrentUser {
            id: UserId::new_v4(),
            email: Email::parse("ana@example.com").unwrap(),
            name: "Ana".to_owned(),
            claims: vec![Claim::SUPPLIER_ADD, Claim::PRODUCT_EDIT],
        };
        assert!(user.has_claim(Claim::SUPPLIER_ADD));
        assert!(!user.has_claim(Claim::SUPPLIER_DELETE));

        let viewer = Viewer::from(user);
        assert!(viewer.can("supplier:add"));
        assert!(viewer.can("Product:Edit"));
        assert!(!viewer.can("product:delete"));
        assert!(!viewer.can("nonsense"));
    }

    #[test]
    fn test_anonymous_viewer_can_nothing() {
        let viewer = Viewer::default();
        assert!(!viewer.is_signed_in());
        assert!(!viewer.can("supplier:add"));
    }
}
