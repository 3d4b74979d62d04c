//! Order repository.
//!
//! Order placement writes the order, its lines, and the matching cart
//! cleanup in a single transaction, so an order can never be created while
//! leaving its cart entries half-consumed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shoebox_core::{Email, OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use super::cart::CartRepository;
use crate::models::order::{Order, OrderLineInput, OrderLineView, OrderStatusCount, OrderView};

const ORDER_COLUMNS: &str = "id, user_id, payment_method, status, created_at, updated_at";

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    payment_method: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            payment_method: row.payment_method,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for order lines joined with current product detail.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineJoinedRow {
    order_id: i32,
    product_id: Option<i32>,
    quantity: i32,
    product_name: Option<String>,
    unit_price: Option<Decimal>,
    image_url: Option<String>,
}

impl From<OrderLineJoinedRow> for OrderLineView {
    fn from(row: OrderLineJoinedRow) -> Self {
        Self {
            product_id: row.product_id.map(ProductId::new),
            quantity: row.quantity,
            product_name: row.product_name,
            unit_price: row.unit_price,
            image_url: row.image_url,
        }
    }
}

/// Internal row type for admin order listings (owner email joined).
#[derive(Debug, sqlx::FromRow)]
struct OrderWithEmailRow {
    id: i32,
    user_id: i32,
    payment_method: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_email: String,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order with its lines and consume the matching cart
    /// entries, all in one transaction.
    ///
    /// The caller has already validated the user and the line set; this
    /// method still fails cleanly (foreign key violation -> `Conflict`) if a
    /// product disappears between validation and insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced product no longer
    /// exists, `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        user_id: UserId,
        items: &[OrderLineInput],
        payment_method: &str,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, payment_method)
             VALUES ($1, $2)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(payment_method)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            sqlx::query("INSERT INTO order_lines (order_id, product_id, quantity) VALUES ($1, $2, $3)")
                .bind(row.id)
                .bind(item.product_id.as_i32())
                .bind(item.quantity)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if let sqlx::Error::Database(ref db_err) = e
                        && db_err.is_foreign_key_violation()
                    {
                        return RepositoryError::Conflict(format!(
                            "product {} no longer exists",
                            item.product_id
                        ));
                    }
                    RepositoryError::Database(e)
                })?;
        }

        let ordered_products: Vec<ProductId> =
            items.iter().map(|item| item.product_id).collect();
        let removed =
            CartRepository::bulk_remove_in(&mut tx, user_id, &ordered_products).await?;

        tx.commit().await?;

        tracing::debug!(
            order_id = row.id,
            cart_entries_removed = removed,
            "order placed"
        );

        Ok(Order::from(row))
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Set an order's status. The caller enforces the transition table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = now()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }

    /// List a user's orders, newest first, lines joined with current
    /// product name/price/image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderView>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.lines_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let order_lines = lines.remove(&r.id).unwrap_or_default();
                OrderView {
                    order: Order::from(r),
                    user_email: None,
                    lines: order_lines,
                }
            })
            .collect())
    }

    /// List all orders (admin view), owner email and lines joined.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderView>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithEmailRow>(
            "SELECT o.id, o.user_id, o.payment_method, o.status,
                    o.created_at, o.updated_at,
                    u.email AS user_email
             FROM orders o
             JOIN users u ON u.id = o.user_id
             ORDER BY o.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.lines_for(&ids).await?;

        let mut views = Vec::with_capacity(rows.len());
        for r in rows {
            let email = Email::parse(&r.user_email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;
            let order_lines = lines.remove(&r.id).unwrap_or_default();
            views.push(OrderView {
                order: Order {
                    id: OrderId::new(r.id),
                    user_id: UserId::new(r.user_id),
                    payment_method: r.payment_method,
                    status: r.status,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
                user_email: Some(email),
                lines: order_lines,
            });
        }
        Ok(views)
    }

    /// Group and count orders by status (admin summary).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts_by_status(&self) -> Result<Vec<OrderStatusCount>, RepositoryError> {
        let rows: Vec<(OrderStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(status, count)| OrderStatusCount { status, count })
            .collect())
    }

    /// Fetch display lines for a set of order ids, grouped by order.
    ///
    /// The product join resolves the CURRENT name/price/image; deleted
    /// products leave those fields `None`.
    async fn lines_for(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderLineView>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderLineJoinedRow>(
            "SELECT ol.order_id, ol.product_id, ol.quantity,
                    p.name AS product_name,
                    p.discounted_price AS unit_price,
                    (SELECT url FROM product_images
                     WHERE product_id = p.id
                     ORDER BY position LIMIT 1) AS image_url
             FROM order_lines ol
             LEFT JOIN products p ON p.id = ol.product_id
             WHERE ol.order_id = ANY($1)
             ORDER BY ol.id",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<OrderLineView>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.order_id)
                .or_default()
                .push(OrderLineView::from(row));
        }
        Ok(grouped)
    }
}
