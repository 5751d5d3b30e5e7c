//! Router tests driven in-process with `tower::ServiceExt::oneshot`.
//!
//! No database is needed: every request here is answered before a query
//! would run, except the readiness probe which must report the outage.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use tower::ServiceExt;

use catalog_integration_tests::{body_text, test_app};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn location(response: &axum::http::Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let response = test_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_without_database() {
    let response = test_app().oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Auth pages
// ============================================================================

#[tokio::test]
async fn test_login_page_renders() {
    let response = test_app().oneshot(get("/auth/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("action=\"/auth/login\""));
    assert!(html.contains("name=\"password\""));
}

#[tokio::test]
async fn test_login_page_shows_known_success_message_only() {
    let response = test_app()
        .oneshot(get("/auth/login?success=registered"))
        .await
        .unwrap();
    assert!(body_text(response).await.contains("Account created"));

    let response = test_app()
        .oneshot(get("/auth/login?success=%3Cb%3Ehi%3C%2Fb%3E"))
        .await
        .unwrap();
    assert!(!body_text(response).await.contains("<b>hi</b>"));
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let response = test_app()
        .oneshot(post_form(
            "/auth/register",
            "email=ana%40example.com&name=Ana&password=long-enough-1&password_confirm=long-enough-2",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("The passwords do not match."));
    assert!(html.contains("value=\"ana@example.com\""));
}

// ============================================================================
// Claim guards
// ============================================================================

#[tokio::test]
async fn test_guarded_pages_redirect_anonymous_to_login() {
    let id = "00000000-0000-4000-8000-000000000001";
    let paths = [
        "/suppliers/new".to_owned(),
        format!("/suppliers/{id}/edit"),
        format!("/suppliers/{id}/delete"),
        format!("/suppliers/{id}/address/edit"),
        "/products/new".to_owned(),
        format!("/products/{id}/edit"),
        format!("/products/{id}/delete"),
    ];

    for path in paths {
        let response = test_app().oneshot(get(&path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/auth/login", "{path}");
    }
}

#[tokio::test]
async fn test_guarded_post_redirects_anonymous_to_login() {
    let response = test_app()
        .oneshot(post_form(
            "/suppliers/new",
            "name=Acme&document=11222333000181&kind=corporate",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

// ============================================================================
// Error pages
// ============================================================================

#[tokio::test]
async fn test_error_pages() {
    let response = test_app().oneshot(get("/error/403")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_text(response).await.contains("Access denied"));

    let response = test_app().oneshot(get("/error/404")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_app().oneshot(get("/error/418")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_not_found_page() {
    let response = test_app().oneshot(get("/no/such/page")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}

#[tokio::test]
async fn test_malformed_id_is_rejected() {
    let response = test_app()
        .oneshot(get("/suppliers/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_pages() {
    let response = test_app().oneshot(get("/auth/login")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store, max-age=0");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let response = test_app().oneshot(get("/health")).await.unwrap();
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "upstream-123")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "upstream-123");
}

#[tokio::test]
async fn test_anonymous_pages_set_no_session_cookie() {
    let response = test_app().oneshot(get("/auth/login")).await.unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}
