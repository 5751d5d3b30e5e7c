//! Authentication and authorization extractors.
//!
//! `RequireAuth` needs a signed-in user. `Authorized<P>` additionally needs
//! the claim named by the permission marker `P`:
//!
//! ```rust,ignore
//! async fn create(
//!     Authorized(user, ..): Authorized<CanAddSupplier>,
//! ) -> impl IntoResponse {
//!     format!("{} may add suppliers", user.name)
//! }
//! ```

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use catalog_core::Claim;

use crate::models::{CurrentUser, session_keys};

/// Where unauthenticated browsers are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where signed-in users without the needed claim are sent.
pub const FORBIDDEN_PATH: &str = "/error/403";

/// Extractor that requires authentication.
pub struct RequireAuth(pub CurrentUser);

/// Rejection for the auth extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No signed-in user; redirect to the login page.
    RedirectToLogin,
    /// Signed in without the claim; redirect to the access denied page.
    RedirectToForbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::RedirectToForbidden => Redirect::to(FORBIDDEN_PATH).into_response(),
        }
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read user from session");
            None
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current user.
///
/// Never rejects; anonymous requests yield `None`.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

// =============================================================================
// Claim Guards
// =============================================================================

/// A permission names the claim a route needs.
pub trait Permission {
    const CLAIM: Claim;
}

macro_rules! permissions {
    ($($(#[$meta:meta])* $name:ident => $claim:expr;)*) => {
        $(
            $(#[$meta])*
            pub struct $name;

            impl Permission for $name {
                const CLAIM: Claim = $claim;
            }
        )*
    };
}

permissions! {
    /// `supplier:add`
    CanAddSupplier => Claim::SUPPLIER_ADD;
    /// `supplier:edit`
    CanEditSupplier => Claim::SUPPLIER_EDIT;
    /// `supplier:delete`
    CanDeleteSupplier => Claim::SUPPLIER_DELETE;
    /// `product:add`
    CanAddProduct => Claim::PRODUCT_ADD;
    /// `product:edit`
    CanEditProduct => Claim::PRODUCT_EDIT;
    /// `product:delete`
    CanDeleteProduct => Claim::PRODUCT_DELETE;
}

/// Extractor that requires a signed-in user holding `P::CLAIM`.
pub struct Authorized<P: Permission>(pub CurrentUser, PhantomData<fn() -> P>);

impl<P: Permission> Authorized<P> {
    #[must_use]
    pub fn user(&self) -> &CurrentUser {
        &self.0
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: Permission,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if user.has_claim(P::CLAIM) {
            return Ok(Self(user, PhantomData));
        }

        tracing::info!(user_id = %user.id, claim = %P::CLAIM, "Missing claim");
        Err(AuthRejection::RedirectToForbidden)
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Store the signed-in user in the session.
///
/// The session ID is cycled first to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Sign out by discarding the whole session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Queue a one-shot message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, message.into()).await
}

/// Take the pending flash message, if any. Read errors yield `None`.
pub async fn take_flash(session: &Session) -> Option<String> {
    session
        .remove::<String>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}
