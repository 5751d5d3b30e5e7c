//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;

use crate::db::{ProductRepository, SupplierRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, take_flash};
use crate::models::Viewer;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub viewer: Viewer,
    pub flash: Option<String>,
    pub supplier_count: i64,
    pub product_count: i64,
}

/// Landing page with catalog totals.
#[tracing::instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let supplier_count = SupplierRepository::new(state.pool()).count().await?;
    let product_count = ProductRepository::new(state.pool()).count().await?;

    Ok(HomeTemplate {
        viewer: Viewer::new(user),
        flash: take_flash(&session).await,
        supplier_count,
        product_count,
    })
}
