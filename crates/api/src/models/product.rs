//! Product catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shoebox_core::{
    Brand, Category, Discount, ProductId, ProductImageId, ProductStatus, ReviewId, UserId,
};

/// A catalog product.
///
/// `discounted_price`, `ratings`, and `num_of_reviews` are derived fields;
/// repositories recompute them inside the same transaction as the mutation
/// that invalidates them.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discount: Discount,
    /// Derived: `round2(price * (1 - discount/100))`.
    pub discounted_price: Decimal,
    pub stock: i32,
    pub brand: Brand,
    pub category: Category,
    pub status: ProductStatus,
    pub images: Vec<ProductImage>,
    /// Derived: mean of review ratings, 0 when there are none.
    pub ratings: Decimal,
    /// Derived: review count.
    pub num_of_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A hosted product image reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(skip_deserializing)]
    pub id: ProductImageId,
    /// Id of the image in the external image store.
    pub storage_id: String,
    pub url: String,
}

/// A product review. At most one per (product, user) pair.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Reviewer display name, snapshotted at review time.
    pub reviewer_name: String,
    /// Reviewer photo URL, snapshotted at review time.
    pub reviewer_photo_url: Option<String>,
    /// 1-5 stars.
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discount: Discount,
    pub stock: i32,
    pub brand: Brand,
    pub category: Category,
    pub status: ProductStatus,
    pub images: Vec<ProductImage>,
}

/// Partial update for a product. Absent fields keep their stored values;
/// when either `price` or `discount` is present, the discounted price is
/// recomputed using the stored value for whichever of the two is absent.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Discount>,
    pub stock: Option<i32>,
    pub brand: Option<Brand>,
    pub category: Option<Category>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// Whether applying this patch requires recomputing the discounted price.
    #[must_use]
    pub const fn touches_pricing(&self) -> bool {
        self.price.is_some() || self.discount.is_some()
    }
}

/// Filters for the public product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive match against name and description.
    pub keyword: Option<String>,
    pub brand: Option<Brand>,
    /// Inclusive lower bound on `discounted_price`.
    pub price_min: Option<Decimal>,
    /// Inclusive upper bound on `discounted_price`.
    pub price_max: Option<Decimal>,
}

/// Input for adding or editing a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: i32,
    pub comment: String,
}

impl NewReview {
    /// Validate the star rating range.
    #[must_use]
    pub const fn rating_in_range(&self) -> bool {
        self.rating >= 1 && self.rating <= 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_touches_pricing() {
        let patch = ProductPatch {
            price: Some(Decimal::new(100, 0)),
            ..Default::default()
        };
        assert!(patch.touches_pricing());

        let patch = ProductPatch {
            stock: Some(5),
            ..Default::default()
        };
        assert!(!patch.touches_pricing());
    }

    #[test]
    fn test_rating_range() {
        let review = |rating| NewReview {
            rating,
            comment: String::new(),
        };
        assert!(review(1).rating_in_range());
        assert!(review(5).rating_in_range());
        assert!(!review(0).rating_in_range());
        assert!(!review(6).rating_in_range());
    }
}
