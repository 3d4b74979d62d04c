//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use shoebox_core::{OrderId, OrderStatus};

use crate::error::Result;
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::order::{Order, OrderLineInput, OrderStatusCount, OrderView};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineInput>,
    pub payment_method: String,
}

/// Body for `PATCH /orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `POST /orders` - place an order from explicit line items.
///
/// Matching cart entries are consumed in the same transaction as the order
/// insert.
#[instrument(skip(state, user, body), fields(items = body.items.len()))]
pub async fn place(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let orders = OrderService::new(state.pool());
    let order = orders
        .place_order(user.user_id(), &body.items, &body.payment_method)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders` - the caller's orders, newest first.
#[instrument(skip(state, user))]
pub async fn mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderService::new(state.pool());
    Ok(Json(orders.my_orders(user.user_id()).await?))
}

/// `GET /orders/all` - every order with owner emails (admin).
#[instrument(skip(state, _admin))]
pub async fn all(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderService::new(state.pool());
    Ok(Json(orders.all_orders().await?))
}

/// `GET /orders/summary` - order counts grouped by status (admin).
#[instrument(skip(state, _admin))]
pub async fn summary(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<OrderStatusCount>>> {
    let orders = OrderService::new(state.pool());
    Ok(Json(orders.status_summary().await?))
}

/// `PATCH /orders/{id}/status` - move an order through its lifecycle (admin).
///
/// Illegal transitions respond 409. A successful change dispatches a push
/// notification to the order's owner, best effort.
#[instrument(skip(state, _admin, body))]
pub async fn set_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let orders = OrderService::new(state.pool());
    let change = orders.update_status(OrderId::new(id), body.status).await?;

    if change.changed
        && let Some(notifier) = state.notifier()
        && let Some(token) = change.owner_fcm_token
    {
        notifier.send_order_status_best_effort(token, change.order.id, change.order.status);
    }

    Ok(Json(change.order))
}
