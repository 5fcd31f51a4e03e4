//! Purchase stock adjustment tests
//!
//! Exercises the credit-side rules: unbounded stock growth, the
//! delete-conflict when purchased units were already sold, the update delta
//! check, lot materialization math, and CSV import accounting.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::types::ImportSummary;
use shared::validation::{validate_amount, validate_quantity};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn credit(stock: i64, quantity: i64) -> i64 {
    stock + quantity
}

/// The conditional debit used when a purchase is reduced or deleted; failing
/// means the purchased units were already consumed.
fn debit_checked(stock: i64, quantity: i64) -> Result<i64, &'static str> {
    if stock >= quantity {
        Ok(stock - quantity)
    } else {
        Err("Purchased units were already sold")
    }
}

/// Same-product purchase update: new_stock = current - old + new, refused
/// when it would go negative
fn update_same_product(stock: i64, old_quantity: i64, new_quantity: i64) -> Result<i64, &'static str> {
    let delta = new_quantity - old_quantity;
    if delta >= 0 {
        Ok(credit(stock, delta))
    } else {
        debit_checked(stock, -delta)
    }
}

/// Unit cost carried by the lot a purchase materializes
fn lot_unit_cost(total_amount: Decimal, quantity: i64) -> Decimal {
    total_amount / Decimal::from(quantity)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_create_purchase_credits_stock() {
        assert_eq!(credit(4, 20), 24);
    }

    /// Purchases have no upper bound
    #[test]
    fn test_create_purchase_unbounded() {
        assert_eq!(credit(i64::MAX - 10, 10), i64::MAX);
    }

    #[test]
    fn test_zero_quantity_purchase_rejected() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_amount(dec("0")).is_err());
    }

    #[test]
    fn test_delete_purchase_round_trip() {
        let initial = 3;
        let bought = 15;
        let after_purchase = credit(initial, bought);
        let after_delete = debit_checked(after_purchase, bought).unwrap();
        assert_eq!(after_delete, initial);
    }

    /// Deleting a purchase whose units were partly sold is a conflict, not
    /// a clamp to zero
    #[test]
    fn test_delete_purchase_conflict_after_sale() {
        let stock = credit(0, 15); // purchase 15
        let stock = stock - 10; // intervening sale of 10
        assert!(debit_checked(stock, 15).is_err());
        // Stock untouched by the failed deletion
        assert_eq!(stock, 5);
    }

    #[test]
    fn test_update_increase_credits_delta() {
        // Bought 10 (stock 12); raising the purchase to 18 adds 8
        assert_eq!(update_same_product(12, 10, 18), Ok(20));
    }

    #[test]
    fn test_update_decrease_within_unsold_stock() {
        // Bought 10, none sold (stock 12); lowering to 4 removes 6
        assert_eq!(update_same_product(12, 10, 4), Ok(6));
    }

    /// Reducing a purchase below what sales already consumed must fail:
    /// new_stock = current - old + new < 0
    #[test]
    fn test_update_decrease_conflicts_with_sales() {
        // Bought 10, sold 8 since (stock 2); lowering the purchase to 1
        // would need 9 units back
        assert!(update_same_product(2, 10, 1).is_err());
    }

    #[test]
    fn test_update_same_quantity_is_noop() {
        assert_eq!(update_same_product(12, 10, 10), Ok(12));
    }

    #[test]
    fn test_lot_unit_cost() {
        assert_eq!(lot_unit_cost(dec("250"), 10), dec("25"));
        assert_eq!(lot_unit_cost(dec("100"), 3).round_dp(4), dec("33.3333"));
    }

    /// A new lot starts with received == available
    #[test]
    fn test_new_lot_quantities() {
        let quantity = 40;
        let (received, available) = (quantity, quantity);
        assert_eq!(received, available);
    }
}

// ============================================================================
// CSV Import Summary Tests
// ============================================================================

#[cfg(test)]
mod import_tests {
    use super::*;

    /// Per-row outcomes of a simulated import batch
    fn run_batch(rows: &[Result<i64, &'static str>]) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for (index, row) in rows.iter().enumerate() {
            match row {
                Ok(_) => summary.record_success(),
                Err(message) => summary.record_error(index + 1, message),
            }
        }
        summary
    }

    #[test]
    fn test_import_counts_add_up() {
        let summary = run_batch(&[Ok(10), Err("Supplier not found"), Ok(5), Err("bad quantity")]);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(summary.total_rows(), 4);
    }

    #[test]
    fn test_import_errors_carry_row_numbers() {
        let summary = run_batch(&[Ok(1), Err("Product not found")]);
        assert_eq!(summary.errors, vec!["row 2: Product not found".to_string()]);
    }

    /// A failing row never stops the rest of the batch
    #[test]
    fn test_import_continues_after_error() {
        let summary = run_batch(&[Err("boom"), Ok(1), Ok(2)]);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.errors.len(), 1);
    }

    #[test]
    fn test_empty_import() {
        let summary = run_batch(&[]);
        assert_eq!(summary.success, 0);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.total_rows(), 0);
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

        /// Stock after a purchase is exactly before plus quantity; the
        /// credit never fails
        #[test]
        fn prop_purchase_credit_exact(stock in 0i64..=1_000_000, quantity in 1i64..=1_000_000) {
            prop_assert_eq!(credit(stock, quantity), stock + quantity);
        }

        /// Create-then-delete restores the original stock when nothing was
        /// sold in between
        #[test]
        fn prop_create_delete_round_trip(stock in 0i64..=1000, quantity in 1i64..=1000) {
            let after_purchase = credit(stock, quantity);
            prop_assert_eq!(debit_checked(after_purchase, quantity), Ok(stock));
        }

        /// With an intervening sale, deletion succeeds only if the remaining
        /// stock still covers the purchase
        #[test]
        fn prop_delete_after_sale(
            stock in 0i64..=1000,
            purchased in 1i64..=500,
            sold in 1i64..=500
        ) {
            let after_purchase = credit(stock, purchased);
            if sold <= after_purchase {
                let after_sale = after_purchase - sold;
                match debit_checked(after_sale, purchased) {
                    Ok(after) => prop_assert_eq!(after, stock - sold),
                    Err(_) => prop_assert!(sold > stock),
                }
            }
        }

        /// The update delta check follows new_stock = current - old + new
        #[test]
        fn prop_update_matches_formula(
            stock in 0i64..=1000,
            old_quantity in 1i64..=500,
            new_quantity in 1i64..=500
        ) {
            let expected = stock - old_quantity + new_quantity;
            match update_same_product(stock, old_quantity, new_quantity) {
                Ok(after) => prop_assert_eq!(after, expected),
                Err(_) => prop_assert!(expected < 0),
            }
        }

        /// A lot's value reconstructs the purchase total
        #[test]
        fn prop_lot_cost_reconstructs_total(
            quantity in 1i64..=10_000,
            cents in 1i64..=10_000_000
        ) {
            let total = Decimal::new(cents, 2);
            let unit_cost = lot_unit_cost(total, quantity);
            let reconstructed = unit_cost * Decimal::from(quantity);
            // Unit cost is exact rational division, so the product is exact
            prop_assert_eq!(reconstructed.round_dp(2), total);
        }

        /// Import accounting: success + errors always equals rows processed
        #[test]
        fn prop_import_accounting(outcomes in prop::collection::vec(any::<bool>(), 0..50)) {
            let mut summary = ImportSummary::default();
            for (index, ok) in outcomes.iter().enumerate() {
                if *ok {
                    summary.record_success();
                } else {
                    summary.record_error(index + 1, "failed");
                }
            }
            prop_assert_eq!(summary.total_rows(), outcomes.len());
        }
    }
}
