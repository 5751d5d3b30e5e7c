//! Session middleware configuration.
//!
//! `PostgreSQL`-backed sessions in `catalog.session`, with signed cookies,
//! SameSite=Strict and a 24 hour inactivity expiry.

use sqlx::PgPool;
use tower_sessions::cookie::{Key, KeyError, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::CatalogConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "catalog_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Errors building the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionLayerError {
    #[error("invalid session store name: {0}")]
    Store(String),

    #[error("invalid session signing key: {0}")]
    Key(#[from] KeyError),
}

/// Build the session store. The table is created by migration.
///
/// # Errors
///
/// Returns `SessionLayerError::Store` if the schema or table name is rejected.
pub fn create_session_store(pool: &PgPool) -> Result<PostgresStore, SessionLayerError> {
    PostgresStore::new(pool.clone())
        .with_schema_name("catalog")
        .map_err(|e| SessionLayerError::Store(e.to_string()))?
        .with_table_name("session")
        .map_err(|e| SessionLayerError::Store(e.to_string()))
}

/// Create the session layer with `PostgreSQL` store.
///
/// # Errors
///
/// Returns `SessionLayerError::Key` if the session secret is shorter than
/// 64 bytes.
pub fn create_session_layer(
    pool: &PgPool,
    config: &CatalogConfig,
) -> Result<SessionManagerLayer<PostgresStore, tower_sessions::service::SignedCookie>, SessionLayerError>
{
    let store = create_session_store(pool)?;
    let key = Key::try_from(config.session_key_bytes())?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
