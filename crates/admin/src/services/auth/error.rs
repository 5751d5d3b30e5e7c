//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] catalog_core::EmailError),

    /// Wrong password or unknown email.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No user with this email.
    #[error("user not found")]
    UserNotFound,

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Display name empty.
    #[error("name is required")]
    MissingName,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show on the login or registration form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(e) => format!("Invalid email: {e}."),
            Self::InvalidCredentials | Self::UserNotFound => {
                "Invalid email or password.".to_owned()
            }
            Self::UserAlreadyExists => "An account with this email already exists.".to_owned(),
            Self::WeakPassword(msg) => format!("{msg}."),
            Self::MissingName => "The Name field is required.".to_owned(),
            Self::Repository(_) | Self::PasswordHash => {
                "Something went wrong. Please try again.".to_owned()
            }
        }
    }
}
