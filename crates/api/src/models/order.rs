//! Order lifecycle domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shoebox_core::{Email, OrderId, OrderStatus, ProductId, UserId};

/// A placed order.
///
/// `status` is the only field ever mutated after creation. Orders are never
/// deleted through normal flow.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Free-text payment tag; no gateway integration.
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A requested order line at placement time.
///
/// No unit price is stored on the line; price resolves from the current
/// product record at read time.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// An order line joined with current product detail for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub product_id: Option<ProductId>,
    pub quantity: i32,
    /// Current product name; None if the product no longer exists.
    pub product_name: Option<String>,
    /// Current discounted unit price, not price-at-purchase.
    pub unit_price: Option<Decimal>,
    pub image_url: Option<String>,
}

/// An order with its lines joined for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    /// Order owner's email; populated for admin listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<Email>,
    pub lines: Vec<OrderLineView>,
}

/// Per-status order count for the admin summary view.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusCount {
    pub status: OrderStatus,
    pub count: i64,
}
