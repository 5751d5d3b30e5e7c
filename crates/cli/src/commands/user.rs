//! User management commands.
//!
//! Users created here go through the same rules as self registration
//! (email format, password length) and may be granted claims up front.

use catalog_admin::services::{AuthError, AuthService};
use catalog_core::{Claim, ClaimParseError};

use super::{CommandError, connect};

#[derive(Debug, thiserror::Error)]
pub enum UserCommandError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Invalid claim: {0}")]
    InvalidClaim(#[from] ClaimParseError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Parse `resource:action` claim arguments, rejecting unknown ones.
fn parse_claims(raw: &[String]) -> Result<Vec<Claim>, ClaimParseError> {
    raw.iter().map(|c| c.parse()).collect()
}

/// Create a user and grant `claims`.
///
/// # Errors
///
/// Returns an error for an unknown claim, an invalid email or password, a
/// duplicate email, or a database failure.
pub async fn create(
    email: &str,
    name: &str,
    password: &str,
    claims: &[String],
) -> Result<(), UserCommandError> {
    let claims = parse_claims(claims)?;
    let pool = connect().await?;

    let user = AuthService::new(&pool)
        .create_user(email, name, password, &claims)
        .await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        claims = claims.len(),
        "User created"
    );
    Ok(())
}

/// Grant `claims` to the user with `email`. Claims already held are kept.
///
/// # Errors
///
/// Returns an error for an unknown claim, an unknown user, or a database
/// failure.
pub async fn grant(email: &str, claims: &[String]) -> Result<(), UserCommandError> {
    let claims = parse_claims(claims)?;
    let pool = connect().await?;

    let user = AuthService::new(&pool).grant(email, &claims).await?;

    for claim in &claims {
        tracing::info!(user_id = %user.id, %claim, "Claim granted");
    }
    Ok(())
}
