//! Cart (orderlist) domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shoebox_core::{CartEntryId, ProductId, UserId};

/// A pending (product, quantity) selection, prior to order placement.
///
/// At most one entry exists per (user, product); re-adding the same product
/// increments the quantity instead of duplicating the row.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields denormalized into cart listings at read time.
///
/// This is NOT a point-in-time snapshot: the displayed price tracks the
/// current product record, so it changes retroactively while an item sits
/// in the cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartProductSnapshot {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discounted_price: Decimal,
    pub image_url: Option<String>,
}

/// A cart entry joined with its current product detail.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntryWithProduct {
    #[serde(flatten)]
    pub entry: CartEntry,
    pub product: CartProductSnapshot,
}
