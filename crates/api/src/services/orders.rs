//! Order lifecycle service.
//!
//! Orders are born in `shipping` and move through an enforced transition
//! table: `shipping` may become `completed` or `cancelled`, both of which
//! are terminal. Re-submitting the current status is an idempotent no-op.

use sqlx::PgPool;
use thiserror::Error;

use shoebox_core::{OrderId, OrderStatus, UserId};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::models::order::{Order, OrderLineInput, OrderStatusCount, OrderView};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Client-supplied input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Order not found.
    #[error("order not found")]
    OrderNotFound,

    /// The ordering account no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// A referenced product doesn't exist.
    #[error("product {0} not found")]
    ProductNotFound(shoebox_core::ProductId),

    /// The requested status change violates the transition table.
    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of a status update, carrying what the notifier needs.
#[derive(Debug)]
pub struct StatusChange {
    pub order: Order,
    /// Push token of the order's owner, when one is registered.
    pub owner_fcm_token: Option<String>,
    /// False when the request repeated the current status and nothing was
    /// written.
    pub changed: bool,
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    products: ProductRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            products: ProductRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Place an order.
    ///
    /// The user and every referenced product are checked up front; the
    /// insert itself and the cart cleanup for the ordered products then
    /// commit in one transaction inside the repository.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for an empty line set, a quantity
    /// below one, or a blank payment method.
    /// Returns `OrderError::UserNotFound` if the account was deleted (a
    /// bearer token can outlive its user).
    /// Returns `OrderError::ProductNotFound` for an unknown product.
    pub async fn place_order(
        &self,
        user_id: UserId,
        items: &[OrderLineInput],
        payment_method: &str,
    ) -> Result<Order, OrderError> {
        if self.users.get_by_id(user_id).await?.is_none() {
            return Err(OrderError::UserNotFound);
        }
        if items.is_empty() {
            return Err(OrderError::Validation(
                "order must contain at least one item".to_owned(),
            ));
        }
        if payment_method.trim().is_empty() {
            return Err(OrderError::Validation(
                "payment method must not be empty".to_owned(),
            ));
        }
        for item in items {
            if item.quantity < 1 {
                return Err(OrderError::Validation(
                    "quantity must be at least 1".to_owned(),
                ));
            }
            if !self.products.exists(item.product_id).await? {
                return Err(OrderError::ProductNotFound(item.product_id));
            }
        }

        Ok(self.orders.create(user_id, items, payment_method).await?)
    }

    /// Move an order to a new status, enforcing the transition table.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    /// Returns `OrderError::InvalidTransition` when the order is terminal
    /// and the request names a different status.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<StatusChange, OrderError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if !order.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        if order.status == next {
            return Ok(StatusChange {
                order,
                owner_fcm_token: None,
                changed: false,
            });
        }

        let updated = self.orders.set_status(order_id, next).await?;

        let owner_fcm_token = self
            .users
            .get_by_id(updated.user_id)
            .await?
            .and_then(|u| u.fcm_token);

        Ok(StatusChange {
            order: updated,
            owner_fcm_token,
            changed: true,
        })
    }

    /// List the caller's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn my_orders(&self, user_id: UserId) -> Result<Vec<OrderView>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// List every order with owner emails (admin view).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn all_orders(&self) -> Result<Vec<OrderView>, OrderError> {
        Ok(self.orders.list_all().await?)
    }

    /// Order counts grouped by status (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn status_summary(&self) -> Result<Vec<OrderStatusCount>, OrderError> {
        Ok(self.orders.counts_by_status().await?)
    }
}
