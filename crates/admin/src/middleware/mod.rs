//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication and claim checks are extractors, see [`auth`].

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    Authorized, CanAddProduct, CanAddSupplier, CanDeleteProduct, CanDeleteSupplier,
    CanEditProduct, CanEditSupplier, OptionalAuth, Permission, RequireAuth, clear_current_user,
    set_current_user, set_flash, take_flash,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionLayerError, create_session_layer};
