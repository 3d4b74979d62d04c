//! Domain types for the API.
//!
//! These types represent validated domain objects separate from database row
//! types; repositories convert rows into these before anything else sees them.

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartEntry, CartEntryWithProduct, CartProductSnapshot};
pub use order::{Order, OrderLineInput, OrderLineView, OrderStatusCount, OrderView};
pub use product::{
    NewProduct, NewReview, Product, ProductFilter, ProductImage, ProductPatch, Review,
};
pub use user::{NewUser, OAuthProfile, User};
