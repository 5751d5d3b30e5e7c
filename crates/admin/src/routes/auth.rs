//! Authentication route handlers.
//!
//! Password sign-in, self registration (no claims) and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::Viewer;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for message display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub viewer: Viewer,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub viewer: Viewer,
    pub email: String,
    pub name: String,
    pub error: Option<String>,
}

/// Map a `success` query code to its message.
fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "registered" => Some("Account created. You can sign in now."),
        "logged_out" => Some("You have been signed out."),
        _ => None,
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        viewer: Viewer::default(),
        email: String::new(),
        error: None,
        success: query
            .success
            .as_deref()
            .and_then(success_message)
            .map(str::to_owned),
    }
    .into_response()
}

/// Handle login form submission.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let failed = |error: String| {
        LoginTemplate {
            viewer: Viewer::default(),
            email: form.email.clone(),
            error: Some(error),
            success: None,
        }
        .into_response()
    };

    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!(error = %e, "Failed to set session");
                return failed(AuthError::PasswordHash.user_message());
            }
            set_sentry_user(&user);
            tracing::info!(user_id = %user.id, "User signed in");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            failed(e.user_message())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate {
        viewer: Viewer::default(),
        email: String::new(),
        name: String::new(),
        error: None,
    }
}

/// Handle registration form submission.
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let failed = |error: String| {
        RegisterTemplate {
            viewer: Viewer::default(),
            email: form.email.clone(),
            name: form.name.clone(),
            error: Some(error),
        }
        .into_response()
    };

    if form.password != form.password_confirm {
        return failed("The passwords do not match.".to_owned());
    }

    match AuthService::new(state.pool())
        .register(&form.email, &form.name, &form.password)
        .await
    {
        Ok(_) => Redirect::to("/auth/login?success=registered").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            failed(e.user_message())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out and discard the session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    Redirect::to("/auth/login?success=logged_out").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_message_only_known_codes() {
        assert!(success_message("registered").is_some());
        assert!(success_message("<script>").is_none());
    }
}
