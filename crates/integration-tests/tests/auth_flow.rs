//! Integration tests for signup, login, and identity reconciliation.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p shoebox-api)
//!
//! Run with: cargo test -p shoebox-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use shoebox_integration_tests::{api_base_url, client, signup_user, unique_email};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_signup_then_login() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("login");

    let (_, user) = signup_user(&client, &email, "a sufficiently long password").await;
    assert_eq!(user["email"], email);
    assert_eq!(user["role"], "user");

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": "a sufficiently long password" }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_signup_conflicts() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("dup");

    signup_user(&client, &email, "a sufficiently long password").await;

    let resp = client
        .post(format!("{base_url}/auth/signup"))
        .json(&json!({
            "name": "Second Account",
            "email": email,
            "password": "another long password here",
        }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_is_unauthorized() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("wrongpw");

    signup_user(&client, &email, "a sufficiently long password").await;

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": "not the right password" }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unknown email reads identically to a wrong password.
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": unique_email("ghost"), "password": "whatever password" }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_oauth_login_is_idempotent() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("oauth");
    let google_id = uuid::Uuid::new_v4().to_string();

    let payload = json!({
        "name": "OAuth User",
        "email": email,
        "google_id": google_id,
        "photo_url": "https://photos.example.com/a.jpg",
    });

    let first: Value = client
        .post(format!("{base_url}/auth/oauth"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to reach API")
        .json()
        .await
        .expect("Failed to parse response");

    let second: Value = client
        .post(format!("{base_url}/auth/oauth"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to reach API")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(first["user"]["id"], second["user"]["id"]);
    assert_eq!(second["user"]["photo_url"], "https://photos.example.com/a.jpg");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_oauth_merges_into_password_account() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email("merge");

    let (_, user) = signup_user(&client, &email, "a sufficiently long password").await;

    // Same email through OAuth resolves to the same account and fills in
    // the missing profile fields without creating a duplicate.
    let body: Value = client
        .post(format!("{base_url}/auth/oauth"))
        .json(&json!({
            "name": "Different Display Name",
            "email": email,
            "google_id": uuid::Uuid::new_v4().to_string(),
            "photo_url": "https://photos.example.com/b.jpg",
        }))
        .send()
        .await
        .expect("Failed to reach API")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["user"]["id"], user["id"]);
    // The original name is kept; only absent fields are merged.
    assert_eq!(body["user"]["name"], user["name"]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_me_requires_token() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (token, _) = signup_user(
        &client,
        &unique_email("me"),
        "a sufficiently long password",
    )
    .await;

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::OK);
}
