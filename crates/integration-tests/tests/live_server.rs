//! Round trips against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`catalog-cli migrate`)
//! - The server running (`cargo run -p catalog-admin`)
//!
//! Run with: `cargo test -p catalog-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, redirect};

use catalog_integration_tests::live_base_url;

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

fn unique_email() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("live-{nanos}@example.com")
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_readiness() {
    let response = client()
        .get(format!("{}/health/ready", live_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_public_listings() {
    let client = client();
    for path in ["/", "/suppliers", "/products"] {
        let response = client
            .get(format!("{}{path}", live_base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_register_login_without_claims() {
    let base_url = live_base_url();
    let client = client();
    let email = unique_email();
    let password = "correct-horse-battery";

    let response = client
        .post(format!("{base_url}/auth/register"))
        .form(&[
            ("email", email.as_str()),
            ("name", "Live Test"),
            ("password", password),
            ("password_confirm", password),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    // Signed in, but a fresh account holds no claims.
    let response = client
        .get(format!("{base_url}/suppliers/new"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/error/403");

    let response = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_live_wrong_password() {
    let response = client()
        .post(format!("{}/auth/login", live_base_url()))
        .form(&[("email", "nobody@example.com"), ("password", "not-the-password")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Invalid email or password.")
    );
}
