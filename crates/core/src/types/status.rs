//! Status and classification enums for Shoebox entities.
//!
//! `OrderStatus` carries the order state machine: `shipping` is the only
//! initial state, and `completed`/`cancelled` are terminal. The transition
//! table lives here, next to the type, so every caller shares one answer to
//! "is this move legal".

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// State machine: `shipping -> completed` or `shipping -> cancelled`.
/// Terminal states accept no further transitions. Re-setting the current
/// status is accepted idempotently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Shipping,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Whether this status accepts no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a transition from `self` to `next` is legal.
    ///
    /// Same-status re-sets are allowed (idempotent no-op); everything out of
    /// a terminal state is rejected.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Shipping, _) => true,
            (current, next) => current as u8 == next as u8,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shipping => write!(f, "shipping"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shipping" => Ok(Self::Shipping),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// User permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Whether this role grants access to administrative operations.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// Product availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Available,
    Unavailable,
    Discontinued,
}

/// Shoe brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "brand", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Brand {
    Nike,
    Adidas,
    Puma,
    Vans,
    Converse,
    NewBalance,
    Reebok,
    Other,
}

impl std::str::FromStr for Brand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nike" => Ok(Self::Nike),
            "adidas" => Ok(Self::Adidas),
            "puma" => Ok(Self::Puma),
            "vans" => Ok(Self::Vans),
            "converse" => Ok(Self::Converse),
            "new_balance" => Ok(Self::NewBalance),
            "reebok" => Ok(Self::Reebok),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid brand: {s}")),
        }
    }
}

/// Shoe category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sneakers,
    Running,
    Basketball,
    Football,
    Casual,
    Formal,
    Sandals,
    Boots,
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sneakers" => Ok(Self::Sneakers),
            "running" => Ok(Self::Running),
            "basketball" => Ok(Self::Basketball),
            "football" => Ok(Self::Football),
            "casual" => Ok(Self::Casual),
            "formal" => Ok(Self::Formal),
            "sandals" => Ok(Self::Sandals),
            "boots" => Ok(Self::Boots),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_order_status_is_shipping() {
        assert_eq!(OrderStatus::default(), OrderStatus::Shipping);
    }

    #[test]
    fn test_shipping_transitions() {
        assert!(OrderStatus::Shipping.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Shipping.can_transition_to(OrderStatus::Cancelled));
        // Same-status re-set is an accepted no-op.
        assert!(OrderStatus::Shipping.can_transition_to(OrderStatus::Shipping));
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Shipping));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Shipping));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_terminal_idempotent_reset() {
        assert!(OrderStatus::Completed.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_order_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipping).unwrap(),
            "\"shipping\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, OrderStatus::Completed);
    }

    #[test]
    fn test_order_status_from_str_rejects_unknown() {
        assert!("delivered".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_role_checks() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
        assert_eq!(UserRole::default(), UserRole::User);
    }

    #[test]
    fn test_brand_parse() {
        assert_eq!("new_balance".parse::<Brand>().unwrap(), Brand::NewBalance);
        assert!("asics".parse::<Brand>().is_err());
    }
}
