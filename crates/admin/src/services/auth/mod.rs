//! Authentication service.
//!
//! Password sign-in with Argon2id hashes. Claims are loaded at sign-in and
//! kept in the session as part of [`CurrentUser`].

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use catalog_core::{Claim, Email};

use crate::db::{RepositoryError, UserRepository};
use crate::models::{CurrentUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password. The user holds no claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> Result<User, AuthError> {
        self.create_user(email, name, password, &[]).await
    }

    /// Create a user and grant the given claims.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        claims: &[Claim],
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        if !claims.is_empty() {
            self.users.grant_claims(user.id, claims).await?;
        }

        tracing::info!(user_id = %user.id, email = %user.email, claims = claims.len(), "User created");
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let claims = self.users.get_claims(user.id).await?;
        Ok(CurrentUser::new(&user, claims))
    }

    /// Grant claims to an existing user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no user has this email.
    pub async fn grant(&self, email: &str, claims: &[Claim]) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.users.grant_claims(user.id, claims).await?;
        tracing::info!(user_id = %user.id, ?claims, "Claims granted");
        Ok(user)
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AuthError::Repository(RepositoryError::NotFound);
        assert!(!err.user_message().contains("not found"));
        assert_eq!(
            AuthError::UserNotFound.user_message(),
            AuthError::InvalidCredentials.user_message()
        );
    }
}
