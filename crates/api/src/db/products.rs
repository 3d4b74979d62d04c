//! Product repository: catalog CRUD, filtered listing, and reviews.
//!
//! Derived fields are maintained here:
//! - `discounted_price` is written only via the core pricing rule, on create
//!   and on any update that touches `price` or `discount`.
//! - `ratings`/`num_of_reviews` are recomputed from the review set inside the
//!   same transaction as every review mutation, so concurrent reviewers
//!   cannot lose an update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use shoebox_core::{
    Brand, Category, Discount, ProductId, ProductImageId, ProductStatus, ReviewId, UserId,
    compute_discounted_price,
};

use super::RepositoryError;
use crate::models::product::{
    NewProduct, NewReview, Product, ProductFilter, ProductImage, ProductPatch, Review,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, discount, discounted_price, stock, \
     brand, category, status, ratings, num_of_reviews, created_at, updated_at";

const REVIEW_COLUMNS: &str = "id, product_id, user_id, reviewer_name, reviewer_photo_url, \
     rating, comment, created_at, updated_at";

/// Internal row type for product queries (images joined separately).
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    discount: Decimal,
    discounted_price: Decimal,
    stock: i32,
    brand: Brand,
    category: Category,
    status: ProductStatus,
    ratings: Decimal,
    num_of_reviews: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, images: Vec<ProductImage>) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price: self.price,
            discount: Discount::clamp(self.discount),
            discounted_price: self.discounted_price,
            stock: self.stock,
            brand: self.brand,
            category: self.category,
            status: self.status,
            images,
            ratings: self.ratings,
            num_of_reviews: self.num_of_reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Internal row type for product image queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: i32,
    product_id: i32,
    storage_id: String,
    url: String,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            storage_id: row.storage_id,
            url: row.url,
        }
    }
}

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    reviewer_name: String,
    reviewer_photo_url: Option<String>,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            reviewer_name: row.reviewer_name,
            reviewer_photo_url: row.reviewer_photo_url,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escape `LIKE`/`ILIKE` metacharacters in user-supplied keywords so they
/// match literally. The backslash goes first, or it would re-escape the
/// escapes added for `%` and `_`.
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product with its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let discounted_price = compute_discounted_price(input.price, input.discount);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products
                 (name, description, price, discount, discounted_price, stock,
                  brand, category, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.discount.percent())
        .bind(discounted_price)
        .bind(input.stock)
        .bind(input.brand)
        .bind(input.category)
        .bind(input.status)
        .fetch_one(&mut *tx)
        .await?;

        let mut images = Vec::with_capacity(input.images.len());
        for (position, image) in input.images.iter().enumerate() {
            let image_row = sqlx::query_as::<_, ProductImageRow>(
                "INSERT INTO product_images (product_id, position, storage_id, url)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, product_id, storage_id, url",
            )
            .bind(row.id)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .bind(&image.storage_id)
            .bind(&image.url)
            .fetch_one(&mut *tx)
            .await?;
            images.push(ProductImage::from(image_row));
        }

        tx.commit().await?;

        Ok(row.into_product(images))
    }

    /// Get a product by id, with its images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let images = self.images_for(&[r.id]).await?.remove(&r.id).unwrap_or_default();
                Ok(Some(r.into_product(images)))
            }
            None => Ok(None),
        }
    }

    /// Whether a product with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM products WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// List products matching the given filters, newest first.
    ///
    /// Price bounds apply to `discounted_price`, which is what shoppers see.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"
        ));

        if let Some(keyword) = &filter.keyword {
            let pattern = format!("%{}%", escape_like(keyword));
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(brand) = filter.brand {
            builder.push(" AND brand = ");
            builder.push_bind(brand);
        }
        if let Some(price_min) = filter.price_min {
            builder.push(" AND discounted_price >= ");
            builder.push_bind(price_min);
        }
        if let Some(price_max) = filter.price_max {
            builder.push(" AND discounted_price <= ");
            builder.push_bind(price_max);
        }
        builder.push(" ORDER BY created_at DESC");

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut images = self.images_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let product_images = images.remove(&r.id).unwrap_or_default();
                r.into_product(product_images)
            })
            .collect())
    }

    /// Apply a partial update, recomputing `discounted_price` only when the
    /// patch touches price or discount (falling back to the stored value for
    /// whichever of the two is absent from the patch).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let pricing = if patch.touches_pricing() {
            let current: Option<(Decimal, Decimal)> =
                sqlx::query_as("SELECT price, discount FROM products WHERE id = $1 FOR UPDATE")
                    .bind(id.as_i32())
                    .fetch_optional(&mut *tx)
                    .await?;

            let Some((stored_price, stored_discount)) = current else {
                return Err(RepositoryError::NotFound);
            };

            let price = patch.price.unwrap_or(stored_price);
            let discount = patch
                .discount
                .unwrap_or_else(|| Discount::clamp(stored_discount));
            Some((price, discount.percent(), compute_discounted_price(price, discount)))
        } else {
            None
        };

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 discount = COALESCE($5, discount),
                 discounted_price = COALESCE($6, discounted_price),
                 stock = COALESCE($7, stock),
                 brand = COALESCE($8, brand),
                 category = COALESCE($9, category),
                 status = COALESCE($10, status),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(pricing.map(|p| p.0))
        .bind(pricing.map(|p| p.1))
        .bind(pricing.map(|p| p.2))
        .bind(patch.stock)
        .bind(patch.brand)
        .bind(patch.category)
        .bind(patch.status)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        tx.commit().await?;

        let images = self.images_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
        Ok(row.into_product(images))
    }

    /// Delete a product. Images, reviews, and cart entries cascade.
    ///
    /// # Returns
    ///
    /// `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// List reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reviews_for(&self, id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM product_reviews
             WHERE product_id = $1 ORDER BY created_at DESC"
        ))
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Add a review. The (product, user) uniqueness constraint surfaces as
    /// `RepositoryError::Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if this user already reviewed the
    /// product, `RepositoryError::Database` for other failures.
    pub async fn add_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        reviewer_name: &str,
        reviewer_photo_url: Option<&str>,
        review: &NewReview,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO product_reviews
                 (product_id, user_id, reviewer_name, reviewer_photo_url, rating, comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .bind(reviewer_name)
        .bind(reviewer_photo_url)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "user has already reviewed this product"))?;

        Self::recompute_review_aggregates(&mut tx, product_id).await?;
        tx.commit().await?;

        Ok(Review::from(row))
    }

    /// Update the caller's own review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no review on this
    /// product.
    pub async fn update_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        review: &NewReview,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE product_reviews
             SET rating = $3, comment = $4, updated_at = now()
             WHERE product_id = $1 AND user_id = $2
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        Self::recompute_review_aggregates(&mut tx, product_id).await?;
        tx.commit().await?;

        Ok(Review::from(row))
    }

    /// Delete the caller's own review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no review on this
    /// product.
    pub async fn delete_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "DELETE FROM product_reviews WHERE product_id = $1 AND user_id = $2",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Self::recompute_review_aggregates(&mut tx, product_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Recompute `ratings` and `num_of_reviews` from the review set.
    ///
    /// Runs inside the caller's transaction so the aggregates can never
    /// drift from the rows they summarize. Resets to 0/0 when the last
    /// review is removed.
    async fn recompute_review_aggregates(
        tx: &mut Transaction<'_, Postgres>,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products
             SET ratings = COALESCE(
                     (SELECT ROUND(AVG(rating)::numeric, 2)
                      FROM product_reviews WHERE product_id = $1),
                     0),
                 num_of_reviews = (SELECT COUNT(*) FROM product_reviews WHERE product_id = $1),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(product_id.as_i32())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Fetch images for a set of product ids, grouped by product.
    async fn images_for(
        &self,
        product_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ProductImage>>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ProductImageRow>(
            "SELECT id, product_id, storage_id, url
             FROM product_images
             WHERE product_id = ANY($1)
             ORDER BY product_id, position",
        )
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<ProductImage>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.product_id)
                .or_default()
                .push(ProductImage::from(row));
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100% wool"), "100\\% wool");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
    }

    #[test]
    fn test_escape_like_backslash_goes_first() {
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("\\%"), "\\\\\\%");
    }

    #[test]
    fn test_escape_like_plain_keyword_unchanged() {
        assert_eq!(escape_like("air max"), "air max");
    }
}
