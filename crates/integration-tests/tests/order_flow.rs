//! End-to-end order flow: cart, checkout, and the status machine.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p shoebox-api)
//! - `ADMIN_PASSWORD` set for an existing admin account
//!
//! Run with: cargo test -p shoebox-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use shoebox_integration_tests::{admin_token, api_base_url, client, signup_user, unique_email};

async fn create_product(client: &Client, token: &str, price: &str, discount: i64) -> i64 {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/products"))
        .bearer_auth(token)
        .json(&json!({
            "name": "Order Flow Trainer",
            "description": "Fixture product for checkout tests",
            "price": price,
            "discount": discount.to_string(),
            "stock": 100,
            "brand": "puma",
            "category": "sneakers",
        }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::CREATED, "product create failed");
    let body: Value = resp.json().await.expect("Failed to parse product");
    body["id"].as_i64().expect("missing id")
}

async fn cart_count(client: &Client, token: &str) -> i64 {
    let base_url = api_base_url();
    let body: Value = client
        .get(format!("{base_url}/cart/count"))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to reach API")
        .json()
        .await
        .expect("Failed to parse count");
    body["count"].as_i64().expect("missing count")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_to_completed_order() {
    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client).await;
    let product_id = create_product(&client, &admin, "1000", 20).await;

    let (token, _) = signup_user(
        &client,
        &unique_email("shopper"),
        "a sufficiently long password",
    )
    .await;

    // Adding the same product twice sums the quantity on one entry.
    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/cart"))
            .bearer_auth(&token)
            .json(&json!({ "product_id": product_id, "quantity": 1 }))
            .send()
            .await
            .expect("Failed to reach API");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let cart: Value = client
        .get(format!("{base_url}/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to reach API")
        .json()
        .await
        .expect("Failed to parse cart");
    let entries = cart.as_array().expect("cart is not an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["quantity"], 2);
    assert_eq!(entries[0]["product"]["discounted_price"], "800.00");
    assert_eq!(cart_count(&client, &token).await, 1);

    // Checkout. The order starts in shipping and the cart is emptied.
    let resp = client
        .post(format!("{base_url}/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{ "product_id": product_id, "quantity": 2 }],
            "payment_method": "card",
        }))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(order["status"], "shipping");
    let order_id = order["id"].as_i64().expect("missing order id");

    assert_eq!(cart_count(&client, &token).await, 0);

    // Admin completes the order.
    let resp = client
        .patch(format!("{base_url}/orders/{order_id}/status"))
        .bearer_auth(&admin)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(updated["status"], "completed");

    // Completed is terminal. Moving it back is a conflict.
    let resp = client
        .patch(format!("{base_url}/orders/{order_id}/status"))
        .bearer_auth(&admin)
        .json(&json!({ "status": "shipping" }))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Repeating the current status is an idempotent no-op.
    let resp = client
        .patch(format!("{base_url}/orders/{order_id}/status"))
        .bearer_auth(&admin)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_entries_are_owner_scoped() {
    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client).await;
    let product_id = create_product(&client, &admin, "50", 0).await;

    let (owner, _) = signup_user(
        &client,
        &unique_email("owner"),
        "a sufficiently long password",
    )
    .await;
    let (intruder, _) = signup_user(
        &client,
        &unique_email("intruder"),
        "a sufficiently long password",
    )
    .await;

    let entry: Value = client
        .post(format!("{base_url}/cart"))
        .bearer_auth(&owner)
        .json(&json!({ "product_id": product_id }))
        .send()
        .await
        .expect("Failed to reach API")
        .json()
        .await
        .expect("Failed to parse entry");
    let entry_id = entry["id"].as_i64().expect("missing entry id");

    // Another user cannot touch the entry.
    let resp = client
        .delete(format!("{base_url}/cart/{entry_id}"))
        .bearer_auth(&intruder)
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The owner can.
    let resp = client
        .delete(format!("{base_url}/cart/{entry_id}"))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_validation() {
    let client = client();
    let base_url = api_base_url();
    let (token, _) = signup_user(
        &client,
        &unique_email("validation"),
        "a sufficiently long password",
    )
    .await;

    // Empty order.
    let resp = client
        .post(format!("{base_url}/orders"))
        .bearer_auth(&token)
        .json(&json!({ "items": [], "payment_method": "card" }))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown product.
    let resp = client
        .post(format!("{base_url}/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{ "product_id": 999_999_999, "quantity": 1 }],
            "payment_method": "card",
        }))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_deleted_account_cannot_place_order() {
    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client).await;
    let product_id = create_product(&client, &admin, "120", 0).await;

    let (token, user) = signup_user(
        &client,
        &unique_email("departed"),
        "a sufficiently long password",
    )
    .await;
    let user_id = user["id"].as_i64().expect("missing user id");

    let resp = client
        .delete(format!("{base_url}/users/{user_id}"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The bearer token is still signature-valid, but its account is gone.
    let resp = client
        .post(format!("{base_url}/orders"))
        .bearer_auth(&token)
        .json(&json!({
            "items": [{ "product_id": product_id, "quantity": 1 }],
            "payment_method": "card",
        }))
        .send()
        .await
        .expect("Failed to reach API");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_order_surface_is_guarded() {
    let client = client();
    let base_url = api_base_url();
    let admin = admin_token(&client).await;
    let (token, _) = signup_user(
        &client,
        &unique_email("plainuser"),
        "a sufficiently long password",
    )
    .await;

    for path in ["/orders/all", "/orders/summary"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to reach API");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{path} not guarded");

        let resp = client
            .get(format!("{base_url}{path}"))
            .bearer_auth(&admin)
            .send()
            .await
            .expect("Failed to reach API");
        assert_eq!(resp.status(), StatusCode::OK, "{path} rejected admin");
    }

    let summary: Value = client
        .get(format!("{base_url}/orders/summary"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to reach API")
        .json()
        .await
        .expect("Failed to parse summary");
    assert!(summary.is_array());
}
