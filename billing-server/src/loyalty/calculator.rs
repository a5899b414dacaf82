//! Category Point & Discount Calculator
//!
//! Pure decimal math over a [`CustomerCategory`]:
//! - base points: one per full `ticket_threshold` spent
//! - earned points: base points scaled by `points_multiplier`, floored
//! - discount: `discount_percentage` of the subtotal, 2 decimal places, half-up

use rust_decimal::prelude::*;
use shared::models::CustomerCategory;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

// All three return `None` when the arithmetic leaves the Decimal range or
// the point count does not fit an i64.

/// Full thresholds contained in `amount`. Non-positive inputs accrue nothing.
pub fn base_points(amount: Decimal, ticket_threshold: Decimal) -> Option<i64> {
    if amount <= Decimal::ZERO || ticket_threshold <= Decimal::ZERO {
        return Some(0);
    }
    amount.checked_div(ticket_threshold)?.floor().to_i64()
}

/// Points a purchase of `amount` earns in `category`.
pub fn points_for_purchase(amount: Decimal, category: &CustomerCategory) -> Option<i64> {
    let base = base_points(amount, category.ticket_threshold)?;
    if base == 0 || category.points_multiplier <= Decimal::ZERO {
        return Some(0);
    }
    Decimal::from(base)
        .checked_mul(category.points_multiplier)?
        .floor()
        .to_i64()
}

/// Discount the category grants on `subtotal`.
pub fn discount_for(subtotal: Decimal, category: &CustomerCategory) -> Option<Decimal> {
    if subtotal <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    let discount = subtotal
        .checked_mul(category.discount_percentage)?
        .checked_div(Decimal::ONE_HUNDRED)?;
    Some(discount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn category(discount: &str, multiplier: &str, threshold: &str) -> CustomerCategory {
        CustomerCategory {
            id: 1,
            name: "Cliente VIP".into(),
            discount_percentage: dec(discount),
            points_multiplier: dec(multiplier),
            ticket_threshold: dec(threshold),
            color: None,
            active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_threshold_ten_multiplier_two() {
        // $50 with threshold 10 = 5 base points, x2 = 10 points
        let cat = category("0", "2", "10");
        assert_eq!(base_points(dec("50"), cat.ticket_threshold), Some(5));
        assert_eq!(points_for_purchase(dec("50"), &cat), Some(10));
    }

    #[test]
    fn test_partial_threshold_is_floored() {
        let cat = category("0", "1", "10");
        assert_eq!(points_for_purchase(dec("19.99"), &cat), Some(1));
        assert_eq!(points_for_purchase(dec("9.99"), &cat), Some(0));
    }

    #[test]
    fn test_fractional_multiplier_is_floored() {
        // 7 base points x 1.5 = 10.5 -> 10
        let cat = category("15", "1.5", "3");
        assert_eq!(points_for_purchase(dec("21"), &cat), Some(10));
    }

    #[test]
    fn test_non_positive_amount_accrues_nothing() {
        let cat = category("0", "2", "10");
        assert_eq!(points_for_purchase(Decimal::ZERO, &cat), Some(0));
        assert_eq!(points_for_purchase(dec("-50"), &cat), Some(0));
    }

    #[test]
    fn test_zero_multiplier_accrues_nothing() {
        let cat = category("0", "0", "10");
        assert_eq!(points_for_purchase(dec("100"), &cat), Some(0));
    }

    #[test]
    fn test_discount_half_up() {
        let cat = category("10", "1", "10");
        assert_eq!(discount_for(dec("100"), &cat), Some(dec("10.00")));
        // 0.125 -> 0.13
        assert_eq!(discount_for(dec("1.25"), &cat), Some(dec("0.13")));
    }

    #[test]
    fn test_zero_discount_category() {
        let cat = category("0", "1", "10");
        assert_eq!(discount_for(dec("80"), &cat), Some(Decimal::ZERO));
    }

    #[test]
    fn test_huge_amount_is_out_of_range() {
        let cat = category("10", "2", "10");
        assert_eq!(discount_for(Decimal::MAX, &cat), None);
        assert_eq!(points_for_purchase(Decimal::MAX, &cat), None);

        // Representable quotient, but too many points for an i64
        let tiny = category("0", "1", "0.0000000001");
        assert_eq!(base_points(dec("1000000000000000"), tiny.ticket_threshold), None);
    }
}
