//! Product catalog service.
//!
//! Validation and review rules on top of the product repository. Derived
//! pricing and rating fields are maintained by the repository inside the
//! mutating transactions; this layer never recomputes them after the fact.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use shoebox_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::models::product::{NewProduct, NewReview, Product, ProductFilter, ProductPatch, Review};
use crate::models::user::User;
use crate::services::profanity::ProfanityFilter;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Client-supplied input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Product not found.
    #[error("product not found")]
    ProductNotFound,

    /// Review not found.
    #[error("review not found")]
    ReviewNotFound,

    /// The user has already reviewed this product.
    #[error("user has already reviewed this product")]
    DuplicateReview,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Product catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    profanity: &'a dyn ProfanityFilter,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, profanity: &'a dyn ProfanityFilter) -> Self {
        Self {
            products: ProductRepository::new(pool),
            profanity,
        }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for a non-positive price, negative
    /// stock, or an empty name.
    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, CatalogError> {
        validate_product_fields(&input.name, Some(input.price), Some(input.stock))?;
        Ok(self.products.create(input).await?)
    }

    /// List products matching the given filters.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list(filter).await?)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product doesn't exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    /// Apply a partial update. When price or discount changes, the stored
    /// discounted price is recomputed in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product doesn't exist.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, CatalogError> {
        if let Some(name) = &patch.name {
            validate_product_fields(name, patch.price, patch.stock)?;
        } else {
            validate_product_fields("unchanged", patch.price, patch.stock)?;
        }

        self.products.update(id, patch).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::ProductNotFound,
            other => CatalogError::Repository(other),
        })
    }

    /// Delete a product. Cart entries referencing it cascade away; order
    /// lines keep their row with a nulled product reference.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product doesn't exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(CatalogError::ProductNotFound)
        }
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the product doesn't exist.
    pub async fn list_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, CatalogError> {
        if !self.products.exists(product_id).await? {
            return Err(CatalogError::ProductNotFound);
        }
        Ok(self.products.reviews_for(product_id).await?)
    }

    /// Add a review. The comment passes through the profanity filter before
    /// it is stored; the reviewer's name and photo are snapshotted.
    ///
    /// At most one review per (product, user). The database enforces this,
    /// so a double-submit race still surfaces as `DuplicateReview`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for an out-of-range rating.
    /// Returns `CatalogError::DuplicateReview` for a second review by the
    /// same user.
    pub async fn add_review(
        &self,
        product_id: ProductId,
        reviewer: &User,
        review: &NewReview,
    ) -> Result<Review, CatalogError> {
        if !review.rating_in_range() {
            return Err(CatalogError::Validation(
                "rating must be between 1 and 5".to_owned(),
            ));
        }
        if !self.products.exists(product_id).await? {
            return Err(CatalogError::ProductNotFound);
        }

        let cleaned = NewReview {
            rating: review.rating,
            comment: self.profanity.censor(&review.comment),
        };

        self.products
            .add_review(
                product_id,
                reviewer.id,
                &reviewer.name,
                reviewer.photo_url.as_deref(),
                &cleaned,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CatalogError::DuplicateReview,
                other => CatalogError::Repository(other),
            })
    }

    /// Replace the caller's own review of a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReviewNotFound` if the user has no review on
    /// this product.
    pub async fn update_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        review: &NewReview,
    ) -> Result<Review, CatalogError> {
        if !review.rating_in_range() {
            return Err(CatalogError::Validation(
                "rating must be between 1 and 5".to_owned(),
            ));
        }

        let cleaned = NewReview {
            rating: review.rating,
            comment: self.profanity.censor(&review.comment),
        };

        self.products
            .update_review(product_id, user_id, &cleaned)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::ReviewNotFound,
                other => CatalogError::Repository(other),
            })
    }

    /// Delete a user's review of a product (moderation path).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReviewNotFound` if no such review exists.
    pub async fn delete_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<(), CatalogError> {
        self.products
            .delete_review(product_id, user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::ReviewNotFound,
                other => CatalogError::Repository(other),
            })
    }
}

/// Shared field checks for create and update paths.
fn validate_product_fields(
    name: &str,
    price: Option<Decimal>,
    stock: Option<i32>,
) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation("name must not be empty".to_owned()));
    }
    if let Some(price) = price
        && price <= Decimal::ZERO
    {
        return Err(CatalogError::Validation(
            "price must be greater than zero".to_owned(),
        ));
    }
    if let Some(stock) = stock
        && stock < 0
    {
        return Err(CatalogError::Validation(
            "stock must not be negative".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_name() {
        assert!(matches!(
            validate_product_fields("  ", None, None),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_price() {
        assert!(matches!(
            validate_product_fields("Air Max", Some(Decimal::ZERO), None),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_stock() {
        assert!(matches!(
            validate_product_fields("Air Max", None, Some(-1)),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_accepts_sane_fields() {
        assert!(validate_product_fields("Air Max", Some(Decimal::new(9999, 2)), Some(10)).is_ok());
    }
}
