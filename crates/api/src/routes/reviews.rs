//! Product review route handlers.
//!
//! One review per (product, user); the reviewer's identity is snapshotted
//! into the review at write time.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use shoebox_core::ProductId;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::product::{NewReview, Review};
use crate::services::auth::AuthService;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Body for posting or editing a review.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// `GET /products/{id}/reviews` - list a product's reviews.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Review>>> {
    let catalog = CatalogService::new(state.pool(), state.profanity());
    Ok(Json(catalog.list_reviews(ProductId::new(id)).await?))
}

/// `POST /products/{id}/reviews` - add a review.
///
/// Responds 409 when the caller has already reviewed this product.
#[instrument(skip(state, user, body))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    // The name/photo snapshot comes from the current record, not the token.
    let reviewer = AuthService::new(state.pool(), state.jwt_keys())
        .get_user(user.user_id())
        .await?;

    let catalog = CatalogService::new(state.pool(), state.profanity());
    let review = catalog
        .add_review(
            ProductId::new(id),
            &reviewer,
            &NewReview {
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// `PUT /products/{id}/reviews` - replace the caller's review.
#[instrument(skip(state, user, body))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<Review>> {
    let catalog = CatalogService::new(state.pool(), state.profanity());
    let review = catalog
        .update_review(
            ProductId::new(id),
            user.user_id(),
            &NewReview {
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;

    Ok(Json(review))
}

/// `DELETE /products/{id}/reviews` - remove the caller's review.
#[instrument(skip(state, user))]
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    let catalog = CatalogService::new(state.pool(), state.profanity());
    catalog.delete_review(ProductId::new(id), user.user_id()).await?;

    Ok(StatusCode::NO_CONTENT)
}
