//! Fixed pricing policy applied to carts and orders.
//!
//! Totals are never stored; they are derived from the current line items
//! every time they are needed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Subtotals strictly above this ship for free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Flat shipping charge below the free-shipping threshold.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Tax rate (18%).
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Derived monetary figures for a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    /// Apply the pricing policy to a subtotal.
    ///
    /// `tax` is rounded to two decimal places, midpoint away from zero.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let shipping = shipping_for(subtotal);
        let tax = (subtotal * TAX_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Sum `unit_price * quantity` over the given lines and price the result.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, u32)>,
    {
        let subtotal = lines
            .into_iter()
            .map(|(price, quantity)| price * Decimal::from(quantity))
            .sum();
        Self::from_subtotal(subtotal)
    }
}

/// Shipping charge for a subtotal.
#[must_use]
pub fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap_or_default()
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(shipping_for(d("1000")), d("50"));
        assert_eq!(shipping_for(d("1000.01")), Decimal::ZERO);
        assert_eq!(shipping_for(Decimal::ZERO), d("50"));
    }

    #[test]
    fn test_totals_for_small_order() {
        let t = Totals::from_subtotal(d("200"));
        assert_eq!(t.shipping, d("50"));
        assert_eq!(t.tax, d("36"));
        assert_eq!(t.total, d("286"));
    }

    #[test]
    fn test_totals_for_large_order() {
        let t = Totals::from_subtotal(d("1500"));
        assert_eq!(t.shipping, Decimal::ZERO);
        assert_eq!(t.tax, d("270"));
        assert_eq!(t.total, d("1770"));
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 0.25 * 0.18 = 0.045
        let t = Totals::from_subtotal(d("0.25"));
        assert_eq!(t.tax, d("0.05"));
        // 99.99 * 0.18 = 17.9982
        let t = Totals::from_subtotal(d("99.99"));
        assert_eq!(t.tax, d("18.00"));
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        for raw in ["0", "1", "499.5", "999.99", "1000", "1000.5", "12345.67"] {
            let t = Totals::from_subtotal(d(raw));
            assert_eq!(t.total, t.subtotal + t.shipping + t.tax, "subtotal {raw}");
        }
    }

    #[test]
    fn test_from_lines() {
        let t = Totals::from_lines([(d("19.99"), 2), (d("5"), 3)]);
        assert_eq!(t.subtotal, d("54.98"));
    }
}
