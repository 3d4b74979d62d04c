//! Cart (orderlist) repository.
//!
//! One row per (user, product). Re-adding a product goes through an atomic
//! `ON CONFLICT .. DO UPDATE` increment so concurrent adds cannot lose an
//! increment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use shoebox_core::{CartEntryId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{CartEntry, CartEntryWithProduct, CartProductSnapshot};

const ENTRY_COLUMNS: &str = "id, user_id, product_id, quantity, created_at, updated_at";

/// Internal row type for cart entry queries.
#[derive(Debug, sqlx::FromRow)]
struct CartEntryRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartEntryRow> for CartEntry {
    fn from(row: CartEntryRow) -> Self {
        Self {
            id: CartEntryId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for cart entries joined with current product detail.
#[derive(Debug, sqlx::FromRow)]
struct CartEntryJoinedRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    product_name: String,
    product_description: String,
    price: Decimal,
    discounted_price: Decimal,
    image_url: Option<String>,
}

impl From<CartEntryJoinedRow> for CartEntryWithProduct {
    fn from(row: CartEntryJoinedRow) -> Self {
        Self {
            entry: CartEntry {
                id: CartEntryId::new(row.id),
                user_id: UserId::new(row.user_id),
                product_id: ProductId::new(row.product_id),
                quantity: row.quantity,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            product: CartProductSnapshot {
                name: row.product_name,
                description: row.product_description,
                price: row.price,
                discounted_price: row.discounted_price,
                image_url: row.image_url,
            },
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to the user's cart, incrementing the existing entry's
    /// quantity if one exists. Atomic against concurrent adds for the same
    /// (user, product) pair.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartEntry, RepositoryError> {
        let row = sqlx::query_as::<_, CartEntryRow>(&format!(
            "INSERT INTO cart_entries (user_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET quantity = cart_entries.quantity + EXCLUDED.quantity,
                           updated_at = now()
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(CartEntry::from(row))
    }

    /// Replace an entry's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no entry with this id belongs
    /// to the user.
    pub async fn set_quantity(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
        quantity: i32,
    ) -> Result<CartEntry, RepositoryError> {
        let row = sqlx::query_as::<_, CartEntryRow>(&format!(
            "UPDATE cart_entries
             SET quantity = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(entry_id.as_i32())
        .bind(user_id.as_i32())
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartEntry::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete an entry, but only if it belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist or is
    /// owned by someone else (the two cases are deliberately not
    /// distinguishable to the caller).
    pub async fn remove(
        &self,
        entry_id: CartEntryId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id.as_i32())
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List the user's cart, each entry joined with current product detail
    /// (read-time, not a snapshot) and the product's first image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartEntryWithProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartEntryJoinedRow>(
            "SELECT ce.id, ce.user_id, ce.product_id, ce.quantity,
                    ce.created_at, ce.updated_at,
                    p.name AS product_name,
                    p.description AS product_description,
                    p.price, p.discounted_price,
                    (SELECT url FROM product_images
                     WHERE product_id = p.id
                     ORDER BY position LIMIT 1) AS image_url
             FROM cart_entries ce
             JOIN products p ON p.id = ce.product_id
             WHERE ce.user_id = $1
             ORDER BY ce.created_at DESC",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartEntryWithProduct::from).collect())
    }

    /// Number of distinct entries in the user's cart (cart badge).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cart_entries WHERE user_id = $1")
                .bind(user_id.as_i32())
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Remove all of the user's entries for the given product set, inside the
    /// caller's transaction. Order placement uses this so the order insert and
    /// the cart cleanup commit together.
    ///
    /// Idempotent: zero matching rows is a success, so placement can name
    /// items that never went through the cart.
    pub(crate) async fn bulk_remove_in(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        product_ids: &[ProductId],
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = product_ids.iter().map(ProductId::as_i32).collect();
        let result = sqlx::query(
            "DELETE FROM cart_entries WHERE user_id = $1 AND product_id = ANY($2)",
        )
        .bind(user_id.as_i32())
        .bind(&ids)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
