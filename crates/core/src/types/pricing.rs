//! The discount pricing rule.
//!
//! A product's `discounted_price` is always derived from its `price` and
//! `discount` percentage. The same pure function is applied at product
//! creation, product update, and the catalog seeder so the invariant
//! `discounted_price == round2(price * (1 - discount/100))` holds everywhere.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A discount percentage, clamped into `[0, 100]`.
///
/// Out-of-range inputs are silently clamped rather than rejected: a raw
/// discount of `150` behaves as `100`, and `-10` behaves as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discount(Decimal);

impl Discount {
    /// A zero discount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Clamp a raw percentage into the valid `[0, 100]` range.
    #[must_use]
    pub fn clamp(raw: Decimal) -> Self {
        Self(raw.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// The clamped percentage value.
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Discount {
    fn from(raw: Decimal) -> Self {
        Self::clamp(raw)
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Compute the post-discount unit price, rounded to 2 decimal places.
///
/// `discount = 0` yields `price` unchanged; `discount = 100` yields zero.
/// The function is pure and must be the only way a `discounted_price` is
/// ever produced.
#[must_use]
pub fn compute_discounted_price(price: Decimal, discount: Discount) -> Decimal {
    let factor = Decimal::ONE - discount.percent() / Decimal::ONE_HUNDRED;
    (price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_basic_discount() {
        let result = compute_discounted_price(dec("1000"), Discount::clamp(dec("20")));
        assert_eq!(result, dec("800.00"));
    }

    #[test]
    fn test_zero_discount_is_identity() {
        let result = compute_discounted_price(dec("99.99"), Discount::ZERO);
        assert_eq!(result, dec("99.99"));
    }

    #[test]
    fn test_full_discount_is_zero() {
        let result = compute_discounted_price(dec("499.50"), Discount::clamp(dec("100")));
        assert_eq!(result, dec("0.00"));
    }

    #[test]
    fn test_discount_above_range_clamps_to_100() {
        let discount = Discount::clamp(dec("150"));
        assert_eq!(discount.percent(), dec("100"));
        assert_eq!(compute_discounted_price(dec("250"), discount), dec("0.00"));
    }

    #[test]
    fn test_discount_below_range_clamps_to_zero() {
        let discount = Discount::clamp(dec("-10"));
        assert_eq!(discount.percent(), dec("0"));
        assert_eq!(compute_discounted_price(dec("250"), discount), dec("250.00"));
    }

    #[test]
    fn test_rounds_to_two_decimal_places() {
        // 33.33 * 0.85 = 28.3305 -> 28.33
        let result = compute_discounted_price(dec("33.33"), Discount::clamp(dec("15")));
        assert_eq!(result, dec("28.33"));
        // 10.05 * 0.5 = 5.025 -> 5.03 (midpoint rounds away from zero)
        let result = compute_discounted_price(dec("10.05"), Discount::clamp(dec("50")));
        assert_eq!(result, dec("5.03"));
    }

    #[test]
    fn test_end_to_end_example() {
        // The storefront scenario: price=500, discount=10 => 450
        let result = compute_discounted_price(dec("500"), Discount::clamp(dec("10")));
        assert_eq!(result, dec("450.00"));
    }

    #[test]
    fn test_discount_serde_transparent() {
        let discount = Discount::clamp(dec("25"));
        assert_eq!(serde_json::to_string(&discount).unwrap(), "\"25\"");
    }
}
