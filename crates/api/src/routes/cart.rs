//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shoebox_core::{CartEntryId, ProductId};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::cart::{CartEntry, CartEntryWithProduct};
use crate::services::cart::CartService;
use crate::state::AppState;

/// Body for `POST /cart`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Body for `PUT /cart/{entry_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// Response for `GET /cart/count`.
#[derive(Debug, Serialize)]
pub struct CartCountResponse {
    pub count: i64,
}

/// `POST /cart` - add a product, incrementing any existing entry.
#[instrument(skip(state, user), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartEntry>)> {
    let cart = CartService::new(state.pool());
    let entry = cart
        .add_item(user.user_id(), body.product_id, body.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /cart` - the caller's cart with current product details.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CartEntryWithProduct>>> {
    let cart = CartService::new(state.pool());
    Ok(Json(cart.list(user.user_id()).await?))
}

/// `GET /cart/count` - number of distinct cart entries (badge).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CartCountResponse>> {
    let cart = CartService::new(state.pool());
    let count = cart.count(user.user_id()).await?;

    Ok(Json(CartCountResponse { count }))
}

/// `PUT /cart/{entry_id}` - replace an entry's quantity.
#[instrument(skip(state, user, body))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(entry_id): Path<i32>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartEntry>> {
    let cart = CartService::new(state.pool());
    let entry = cart
        .update_quantity(user.user_id(), CartEntryId::new(entry_id), body.quantity)
        .await?;

    Ok(Json(entry))
}

/// `DELETE /cart/{entry_id}` - remove an entry.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(entry_id): Path<i32>,
) -> Result<StatusCode> {
    let cart = CartService::new(state.pool());
    cart.remove_item(user.user_id(), CartEntryId::new(entry_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
