//! Sale stock adjustment tests
//!
//! Exercises the decision rules behind sale create/update/delete: the
//! conditional debit, the same-product delta math, the cross-product
//! restore-then-debit unit, and the create/delete round trip.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{classify_stock_status, StockStatus};
use shared::validation::{validate_amount, validate_quantity};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// The conditional debit used by every sale-side write:
/// `UPDATE .. SET quantity = quantity - q WHERE quantity >= q`
fn debit(stock: i64, quantity: i64) -> Result<i64, &'static str> {
    if stock >= quantity {
        Ok(stock - quantity)
    } else {
        Err("Insufficient stock")
    }
}

fn credit(stock: i64, quantity: i64) -> i64 {
    stock + quantity
}

/// Same-product sale update: reconcile stock with the changed quantity
fn update_same_product(stock: i64, old_quantity: i64, new_quantity: i64) -> Result<i64, &'static str> {
    let delta = new_quantity - old_quantity;
    if delta > 0 {
        debit(stock, delta)
    } else {
        Ok(credit(stock, -delta))
    }
}

/// Cross-product sale update as one atomic unit: restore the old product,
/// debit the new one; failure leaves both untouched.
fn update_cross_product(
    old_stock: i64,
    new_stock: i64,
    old_quantity: i64,
    new_quantity: i64,
) -> Result<(i64, i64), &'static str> {
    let restored = credit(old_stock, old_quantity);
    match debit(new_stock, new_quantity) {
        Ok(debited) => Ok((restored, debited)),
        // Transaction rollback: the restoration is undone with the debit
        Err(e) => Err(e),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_create_sale_debits_stock() {
        assert_eq!(debit(10, 6), Ok(4));
    }

    #[test]
    fn test_create_sale_insufficient_leaves_stock() {
        let stock = 10;
        assert!(debit(stock, 12).is_err());
        // The conditional update touched nothing
        assert_eq!(stock, 10);
    }

    #[test]
    fn test_create_sale_exact_stock_allowed() {
        assert_eq!(debit(10, 10), Ok(0));
    }

    /// End-to-end scenario: product at 10, threshold 5
    #[test]
    fn test_sale_scenario_with_status() {
        let threshold = 5;
        let stock = 10;

        // Zero-quantity documents are rejected before any store access
        assert!(validate_quantity(0).is_err());

        // Selling 12 of 10 fails and the stock stays put
        assert!(debit(stock, 12).is_err());
        assert_eq!(classify_stock_status(stock, threshold), StockStatus::Normal);

        // Selling 6 of 10 leaves 4: low stock
        let stock = debit(stock, 6).unwrap();
        assert_eq!(stock, 4);
        assert_eq!(classify_stock_status(stock, threshold), StockStatus::Low);

        // Selling the rest leaves 0: critical
        let stock = debit(stock, 4).unwrap();
        assert_eq!(classify_stock_status(stock, threshold), StockStatus::Critical);
    }

    #[test]
    fn test_delete_sale_round_trip() {
        let initial = 25;
        let sold = 9;
        let after_sale = debit(initial, sold).unwrap();
        let after_delete = credit(after_sale, sold);
        assert_eq!(after_delete, initial);
    }

    /// Updating a sale to its current quantity leaves stock unchanged
    #[test]
    fn test_update_same_quantity_is_noop() {
        assert_eq!(update_same_product(7, 5, 5), Ok(7));
    }

    #[test]
    fn test_update_increase_debits_delta() {
        // Sold 5 of 12 (7 left); raising to 9 takes 4 more
        assert_eq!(update_same_product(7, 5, 9), Ok(3));
    }

    #[test]
    fn test_update_decrease_credits_delta() {
        // Sold 5 of 12 (7 left); lowering to 2 returns 3
        assert_eq!(update_same_product(7, 5, 2), Ok(10));
    }

    #[test]
    fn test_update_increase_beyond_stock_fails() {
        // 7 left, raising the sale by 8 cannot be covered
        assert!(update_same_product(7, 5, 13).is_err());
    }

    /// Moving a sale from product A to product B without stock on B fails
    /// and leaves A at its pre-update value
    #[test]
    fn test_cross_product_update_rolls_back() {
        let a_stock = 5; // A after the original sale of 5
        let b_stock = 2;

        let result = update_cross_product(a_stock, b_stock, 5, 5);
        assert!(result.is_err());
        // Both untouched after rollback
        assert_eq!(a_stock, 5);
        assert_eq!(b_stock, 2);
    }

    #[test]
    fn test_cross_product_update_moves_stock() {
        let (a_after, b_after) = update_cross_product(5, 8, 5, 3).unwrap();
        assert_eq!(a_after, 10);
        assert_eq!(b_after, 5);
    }

    #[test]
    fn test_sale_input_validation() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-4).is_err());
        assert!(validate_amount(dec("49.90")).is_ok());
        assert!(validate_amount(dec("0")).is_err());
        assert!(validate_amount(dec("-1")).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stock after a successful sale is exactly before minus quantity,
        /// and a failed sale implies quantity exceeded stock
        #[test]
        fn prop_sale_debit_exact(stock in 0i64..=1000, quantity in 1i64..=1000) {
            match debit(stock, quantity) {
                Ok(after) => {
                    prop_assert_eq!(after, stock - quantity);
                    prop_assert!(after >= 0);
                }
                Err(_) => prop_assert!(quantity > stock),
            }
        }

        /// Create-then-delete always restores the original stock
        #[test]
        fn prop_create_delete_round_trip(stock in 0i64..=1000, quantity in 1i64..=1000) {
            if let Ok(after_sale) = debit(stock, quantity) {
                prop_assert_eq!(credit(after_sale, quantity), stock);
            }
        }

        /// A same-product update is equivalent to deleting and recreating
        /// the sale at the new quantity
        #[test]
        fn prop_update_equals_recreate(
            stock in 0i64..=1000,
            old_quantity in 1i64..=500,
            new_quantity in 1i64..=500
        ) {
            let via_delta = update_same_product(stock, old_quantity, new_quantity);
            let via_recreate = debit(credit(stock, old_quantity), new_quantity);
            prop_assert_eq!(via_delta, via_recreate);
        }

        /// Updating to the same quantity never moves stock
        #[test]
        fn prop_update_idempotent(stock in 0i64..=1000, quantity in 1i64..=500) {
            prop_assert_eq!(update_same_product(stock, quantity, quantity), Ok(stock));
        }

        /// A cross-product move preserves the combined stock plus the
        /// document quantities on success
        #[test]
        fn prop_cross_product_conserves_units(
            a_stock in 0i64..=1000,
            b_stock in 0i64..=1000,
            old_quantity in 1i64..=500,
            new_quantity in 1i64..=500
        ) {
            if let Ok((a_after, b_after)) =
                update_cross_product(a_stock, b_stock, old_quantity, new_quantity)
            {
                prop_assert_eq!(
                    a_after + b_after,
                    a_stock + b_stock + old_quantity - new_quantity
                );
                prop_assert!(b_after >= 0);
            }
        }
    }
}
