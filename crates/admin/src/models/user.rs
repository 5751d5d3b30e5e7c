//! Back-office user domain types.

use chrono::{DateTime, Utc};

use catalog_core::{Email, UserId};

/// A user who can sign in to the catalog.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
