//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::CatalogConfig;
use crate::services::ImageStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CatalogConfig,
    pool: PgPool,
    images: ImageStore,
}

impl AppState {
    /// Create a new application state. The image store points at the
    /// configured upload directory.
    #[must_use]
    pub fn new(config: CatalogConfig, pool: PgPool) -> Self {
        let images = ImageStore::new(config.upload_dir.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                images,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }
}
