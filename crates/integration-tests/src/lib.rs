//! Integration tests for Shoebox.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed the database, then start the API
//! cargo run -p shoebox-cli -- migrate
//! cargo run -p shoebox-cli -- admin create -e admin@example.com -n Admin -p <password>
//! cargo run -p shoebox-api
//!
//! # Run integration tests
//! cargo test -p shoebox-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `API_BASE_URL` - API under test (default: `http://localhost:8000`)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - credentials of an existing admin,
//!   used by tests that exercise the admin surface

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API under test (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A plain HTTP client. Auth is a bearer header, no cookies involved.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// Sign up a throwaway user and return `(token, user_json)`.
///
/// # Panics
///
/// Panics when the API is unreachable or the signup is rejected.
pub async fn signup_user(client: &Client, email: &str, password: &str) -> (String, Value) {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/auth/signup"))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED, "signup failed");
    let body: Value = resp.json().await.expect("Failed to parse signup response");
    let token = body["token"].as_str().expect("missing token").to_string();
    (token, body["user"].clone())
}

/// Login as the environment-configured admin and return a bearer token.
///
/// # Panics
///
/// Panics when the credentials are missing or rejected.
pub async fn admin_token(client: &Client) -> String {
    let base_url = api_base_url();
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), reqwest::StatusCode::OK, "admin login failed");
    let body: Value = resp.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("missing token").to_string()
}

/// A unique throwaway email for one test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.example.com", uuid::Uuid::new_v4())
}
