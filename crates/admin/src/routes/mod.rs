//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                 - Dashboard
//!
//! # Auth
//! GET  /auth/login                       - Login page
//! POST /auth/login                       - Password login
//! GET  /auth/register                    - Registration page
//! POST /auth/register                    - Create account (no claims)
//! POST /auth/logout                      - Logout
//!
//! # Suppliers
//! GET  /suppliers                        - Supplier listing
//! GET  /suppliers/{id}                   - Supplier details
//! GET  /suppliers/new                    - Creation form      (supplier:add)
//! POST /suppliers/new                    - Create supplier    (supplier:add)
//! GET  /suppliers/{id}/edit              - Edit form          (supplier:edit)
//! POST /suppliers/{id}/edit              - Update supplier    (supplier:edit)
//! GET  /suppliers/{id}/delete            - Delete confirm     (supplier:delete)
//! POST /suppliers/{id}/delete            - Delete supplier    (supplier:delete)
//! GET  /suppliers/{id}/address           - Address fragment
//! GET  /suppliers/{id}/address/edit      - Address form       (supplier:edit)
//! POST /suppliers/{id}/address/edit      - Update address     (supplier:edit)
//!
//! # Products
//! GET  /products                         - Product listing
//! GET  /products/{id}                    - Product details
//! GET  /products/new                     - Creation form      (product:add)
//! POST /products/new                     - Create (multipart) (product:add)
//! GET  /products/{id}/edit               - Edit form          (product:edit)
//! POST /products/{id}/edit               - Update (multipart) (product:edit)
//! GET  /products/{id}/delete             - Delete confirm     (product:delete)
//! POST /products/{id}/delete             - Delete product     (product:delete)
//!
//! # Errors
//! GET  /error/{code}                     - Friendly error page
//! ```

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::config::CatalogConfig;
use crate::state::AppState;

pub mod auth;
pub mod errors;
pub mod home;
pub mod products;
pub mod suppliers;

/// Build the application router.
///
/// Product writes carry images, so they get the configured upload limit
/// instead of axum's default body limit.
pub fn routes(config: &CatalogConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .merge(auth_routes())
        .merge(supplier_routes())
        .merge(product_routes(config.max_upload_bytes))
        .route("/error/{code}", get(errors::show))
        .fallback(errors::not_found)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/register", get(auth::register_page).post(auth::register))
        .route("/auth/logout", post(auth::logout))
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(suppliers::index))
        .route(
            "/suppliers/new",
            get(suppliers::new_page).post(suppliers::create),
        )
        .route("/suppliers/{id}", get(suppliers::show))
        .route(
            "/suppliers/{id}/edit",
            get(suppliers::edit_page).post(suppliers::update),
        )
        .route(
            "/suppliers/{id}/delete",
            get(suppliers::delete_page).post(suppliers::delete),
        )
        .route("/suppliers/{id}/address", get(suppliers::address))
        .route(
            "/suppliers/{id}/address/edit",
            get(suppliers::address_edit_page).post(suppliers::address_update),
        )
}

fn product_routes(max_upload_bytes: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/products/new", get(products::new_page).post(products::create))
        .route(
            "/products/{id}/edit",
            get(products::edit_page).post(products::update),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route(
            "/products/{id}/delete",
            get(products::delete_page).post(products::delete),
        )
        .merge(uploads)
}
