//! User repository for database operations.
//!
//! Covers back-office users, their password hashes and their claims.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use catalog_core::{Claim, Email, UserId};

use super::{RepositoryError, unique_violation};
use crate::models::User;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO catalog.app_user (id, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, created_at, updated_at
            ",
        )
        .bind(UserId::new_v4())
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| unique_violation(e, "email"))?;

        row.try_into()
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, name, created_at, updated_at
            FROM catalog.app_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user together with their password hash, for sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(
            r"
            SELECT id, email, name, created_at, updated_at, password_hash
            FROM catalog.app_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.user.try_into()?, r.password_hash)))
            .transpose()
    }

    /// Get the claims granted to a user.
    ///
    /// Unknown claim values are skipped with a warning so that a claim
    /// removed from the application does not lock its holders out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_claims(&self, user_id: UserId) -> Result<Vec<Claim>, RepositoryError> {
        let values: Vec<String> = sqlx::query_scalar(
            "SELECT claim FROM catalog.user_claim WHERE user_id = $1 ORDER BY claim",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(values
            .iter()
            .filter_map(|value| match value.parse::<Claim>() {
                Ok(claim) => Some(claim),
                Err(e) => {
                    tracing::warn!(%user_id, claim = %value, error = %e, "Skipping unknown claim");
                    None
                }
            })
            .collect())
    }

    /// Grant claims to a user. Claims already held are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn grant_claims(
        &self,
        user_id: UserId,
        claims: &[Claim],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for claim in claims {
            sqlx::query(
                r"
                INSERT INTO catalog.user_claim (user_id, claim)
                VALUES ($1, $2)
                ON CONFLICT (user_id, claim) DO NOTHING
                ",
            )
            .bind(user_id)
            .bind(claim.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
