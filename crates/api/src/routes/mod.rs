//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (database ping)
//!
//! # Auth
//! POST   /auth/signup             - Register with email and password
//! POST   /auth/login              - Password login
//! POST   /auth/oauth              - Google OAuth login / registration
//! POST   /auth/sync               - Find-or-create from a partial profile
//! POST   /auth/logout             - Release the caller's push token (user)
//! GET    /auth/me                 - Own account record (user)
//! PUT    /auth/me                 - Update profile fields (user)
//!
//! # Products
//! GET    /products                - Listing (?keyword=&brand=&price.min=&price.max=)
//! GET    /products/{id}           - Product detail
//! POST   /products                - Create (admin)
//! PUT    /products/{id}           - Partial update (admin)
//! DELETE /products/{id}           - Delete (admin)
//!
//! # Reviews
//! GET    /products/{id}/reviews   - List reviews
//! POST   /products/{id}/reviews   - Add a review (user, one per product)
//! PUT    /products/{id}/reviews   - Edit own review (user)
//! DELETE /products/{id}/reviews   - Delete own review (user)
//!
//! # Cart
//! POST   /cart                    - Add item, incrementing on re-add (user)
//! GET    /cart                    - List with current product detail (user)
//! GET    /cart/count              - Distinct entry count (user)
//! PUT    /cart/{entry_id}         - Replace quantity (user)
//! DELETE /cart/{entry_id}         - Remove entry (user)
//!
//! # Orders
//! POST   /orders                  - Place an order (user)
//! GET    /orders                  - Own orders (user)
//! GET    /orders/all              - Every order with owner emails (admin)
//! GET    /orders/summary          - Counts grouped by status (admin)
//! PATCH  /orders/{id}/status      - Lifecycle transition (admin)
//!
//! # Users
//! DELETE /users/{id}              - Delete an account (admin)
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};

use crate::error::Result;
use crate::state::AppState;

/// `GET /health` - liveness.
async fn health() -> &'static str {
    "OK"
}

/// `GET /health/ready` - readiness; pings the database.
async fn health_ready(State(state): State<AppState>) -> Result<StatusCode> {
    sqlx::query("SELECT 1")
        .execute(state.pool())
        .await
        .map_err(crate::db::RepositoryError::from)?;
    Ok(StatusCode::OK)
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/oauth", post(auth::oauth))
        .route("/sync", post(auth::sync))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).put(auth::update_me))
}

/// Create the product and review routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/{id}/reviews",
            get(reviews::list)
                .post(reviews::create)
                .put(reviews::update)
                .delete(reviews::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::add).get(cart::list))
        .route("/count", get(cart::count))
        .route("/{entry_id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::place).get(orders::mine))
        .route("/all", get(orders::all))
        .route("/summary", get(orders::summary))
        .route("/{id}/status", patch(orders::set_status))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .route("/users/{id}", delete(auth::delete_user))
}
