//! Business logic services.
//!
//! Services are thin, per-request wrappers over the repositories in
//! [`crate::db`]. Anything that must leave the request path (identity
//! mirroring, push delivery) goes through a handle held in app state.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod mirror;
pub mod notify;
pub mod orders;
pub mod profanity;

pub use auth::{AuthError, AuthService, JwtKeys};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService};
pub use mirror::{MirrorHandle, MirrorJob};
pub use notify::Notifier;
pub use orders::{OrderError, OrderService};
pub use profanity::{DenylistFilter, ProfanityFilter};
