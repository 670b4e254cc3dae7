//! # Revenue Module
//!
//! Net revenue of a single order.
//!
//! ## Formula
//! ```text
//! for each item:
//!     effective_qty   = max(0, qty - returned_qty)
//!     effective_price = unit_price - discount_per_unit     (may go negative)
//!     line            = effective_price × effective_qty
//!
//! net = max(0, Σ line)
//!
//! shipping_cost and other_fees: NEVER included
//! ```
//!
//! Only the final sum is clamped. A line with an oversized discount
//! contributes a negative amount that offsets other lines of the same order.

use crate::money::Money;
use crate::types::{Order, OrderItem};

/// Contribution of one line before order-level clamping. May be negative.
#[inline]
pub fn line_net_revenue(item: &OrderItem) -> Money {
    item.effective_unit_price().multiply_quantity(item.effective_qty())
}

/// Computes an order's net revenue.
///
/// Shipping and other fees are excluded unconditionally, and the result is
/// never negative.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use whisper_core::money::Money;
/// use whisper_core::revenue::compute_order_net_revenue;
/// use whisper_core::types::{Order, OrderItem};
///
/// let order = Order {
///     id: "o-1".to_string(),
///     conversation_id: None,
///     utm_campaign_id: None,
///     customer_phone: "+573001112233".to_string(),
///     created_at: Utc::now(),
///     items: vec![OrderItem {
///         sku: "CAD-ORO".to_string(),
///         title: "Cadena Oro 18k".to_string(),
///         unit_price: Money::from_major(100_000),
///         qty: 2,
///         returned_qty: None,
///         discount_per_unit: None,
///     }],
///     shipping_cost: Money::from_major(15_000),
///     other_fees: None,
///     currency: "COP".to_string(),
/// };
///
/// assert_eq!(compute_order_net_revenue(&order), Money::from_major(200_000));
/// ```
pub fn compute_order_net_revenue(order: &Order) -> Money {
    order
        .items
        .iter()
        .map(line_net_revenue)
        .sum::<Money>()
        .clamp_non_negative()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(unit_price: i64, qty: i64, returned: Option<i64>, discount: Option<i64>) -> OrderItem {
        OrderItem {
            sku: "ANI-PLATA".to_string(),
            title: "Anillo Plata".to_string(),
            unit_price: Money::from_major(unit_price),
            qty,
            returned_qty: returned,
            discount_per_unit: discount.map(Money::from_major),
        }
    }

    fn order(items: Vec<OrderItem>, shipping: i64) -> Order {
        Order {
            id: "o-1".to_string(),
            conversation_id: None,
            utm_campaign_id: None,
            customer_phone: "+573001112233".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap(),
            items,
            shipping_cost: Money::from_major(shipping),
            other_fees: Some(Money::from_major(3_000)),
            currency: "COP".to_string(),
        }
    }

    #[test]
    fn test_simple_order() {
        let o = order(vec![item(100_000, 2, None, None)], 15_000);
        assert_eq!(compute_order_net_revenue(&o), Money::from_major(200_000));
    }

    #[test]
    fn test_discount_and_partial_return() {
        // (120000 - 5000) × (3 - 1) = 230000
        let o = order(vec![item(120_000, 3, Some(1), Some(5_000))], 12_000);
        assert_eq!(compute_order_net_revenue(&o), Money::from_major(230_000));
    }

    #[test]
    fn test_empty_items_is_zero() {
        let o = order(Vec::new(), 15_000);
        assert_eq!(compute_order_net_revenue(&o), Money::zero());
    }

    #[test]
    fn test_full_return_is_zero() {
        let o = order(
            vec![item(180_000, 1, Some(1), None), item(50_000, 4, Some(4), Some(1_000))],
            15_000,
        );
        assert_eq!(compute_order_net_revenue(&o), Money::zero());
    }

    #[test]
    fn test_return_exceeding_quantity_does_not_go_negative() {
        let o = order(vec![item(50_000, 1, Some(5), None)], 0);
        assert_eq!(line_net_revenue(&o.items[0]), Money::zero());
        assert_eq!(compute_order_net_revenue(&o), Money::zero());
    }

    #[test]
    fn test_oversized_discount_offsets_other_lines() {
        // Line 1: (10000 - 15000) × 2 = -10000
        // Line 2: 30000 × 1 = 30000
        let o = order(
            vec![item(10_000, 2, None, Some(15_000)), item(30_000, 1, None, None)],
            0,
        );
        assert_eq!(line_net_revenue(&o.items[0]), Money::from_major(-10_000));
        assert_eq!(compute_order_net_revenue(&o), Money::from_major(20_000));
    }

    #[test]
    fn test_negative_total_clamps_to_zero() {
        let o = order(vec![item(10_000, 1, None, Some(25_000))], 0);
        assert_eq!(compute_order_net_revenue(&o), Money::zero());
    }

    #[test]
    fn test_shipping_and_fees_never_change_revenue() {
        let items = vec![item(75_000, 3, Some(1), Some(2_500))];
        let baseline = compute_order_net_revenue(&order(items.clone(), 0));

        for shipping in [1, 12_000, 15_000, 1_000_000] {
            let mut o = order(items.clone(), shipping);
            assert_eq!(compute_order_net_revenue(&o), baseline);
            o.other_fees = None;
            assert_eq!(compute_order_net_revenue(&o), baseline);
        }
    }
}
