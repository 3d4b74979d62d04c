//! Cart (orderlist) service.

use sqlx::PgPool;
use thiserror::Error;

use shoebox_core::{CartEntryId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::models::cart::{CartEntry, CartEntryWithProduct};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Client-supplied input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Product not found.
    #[error("product not found")]
    ProductNotFound,

    /// Cart entry not found (or owned by another user).
    #[error("cart entry not found")]
    EntryNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart service.
pub struct CartService<'a> {
    cart: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Add a product to the user's cart. Re-adding a product increments the
    /// existing entry's quantity atomically.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a quantity below one.
    /// Returns `CartError::ProductNotFound` if the product doesn't exist.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartEntry, CartError> {
        if quantity < 1 {
            return Err(CartError::Validation(
                "quantity must be at least 1".to_owned(),
            ));
        }
        if !self.products.exists(product_id).await? {
            return Err(CartError::ProductNotFound);
        }

        Ok(self
            .cart
            .upsert_increment(user_id, product_id, quantity)
            .await?)
    }

    /// Replace an entry's quantity. Unlike add, this does not accumulate.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a quantity below one (removal is
    /// its own operation, not a zero-quantity update).
    /// Returns `CartError::EntryNotFound` if no such entry belongs to the user.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
        quantity: i32,
    ) -> Result<CartEntry, CartError> {
        if quantity < 1 {
            return Err(CartError::Validation(
                "quantity must be at least 1".to_owned(),
            ));
        }

        self.cart
            .set_quantity(entry_id, user_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::EntryNotFound,
                other => CartError::Repository(other),
            })
    }

    /// Remove an entry from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::EntryNotFound` if no such entry belongs to the user.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        entry_id: CartEntryId,
    ) -> Result<(), CartError> {
        self.cart
            .remove(entry_id, user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::EntryNotFound,
                other => CartError::Repository(other),
            })
    }

    /// List the user's cart with current product details.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartEntryWithProduct>, CartError> {
        Ok(self.cart.list_for_user(user_id).await?)
    }

    /// Number of distinct entries in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, CartError> {
        Ok(self.cart.count_for_user(user_id).await?)
    }
}
