//! Stock lot ledger tests
//!
//! Covers FIFO allocation, weighted average cost, stock status
//! classification, and the slow-moving inventory report.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{
    allocate_fifo, classify_stock_status, lot_age_days, slow_moving_lots, weighted_average_cost,
    StockLot, StockStatus,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn lot_on(available: i64, cost: &str, year: i32, month: u32, day: u32) -> StockLot {
    StockLot {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        purchase_id: Some(Uuid::new_v4()),
        quantity_received: available,
        quantity_available: available,
        unit_cost: dec(cost),
        purchase_date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        created_at: Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Lots of 3 @ 100 and 7 @ 200 average to 170
    #[test]
    fn test_weighted_average_cost_example() {
        let lots = vec![lot_on(3, "100", 2024, 1, 1), lot_on(7, "200", 2024, 2, 1)];

        let total: i64 = lots.iter().map(|l| l.quantity_available).sum();
        assert_eq!(total, 10);
        assert_eq!(weighted_average_cost(&lots), Some(dec("170")));
    }

    #[test]
    fn test_weighted_average_none_without_stock() {
        assert_eq!(weighted_average_cost(&[]), None);

        let mut depleted = lot_on(5, "80", 2024, 1, 1);
        depleted.quantity_available = 0;
        assert_eq!(weighted_average_cost(&[depleted]), None);
    }

    #[test]
    fn test_fifo_takes_oldest_first() {
        let old = lot_on(3, "100", 2024, 1, 1);
        let new = lot_on(7, "200", 2024, 2, 1);
        let lots = vec![old.clone(), new.clone()];

        let allocations = allocate_fifo(&lots, 5).unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].lot_id, old.id);
        assert_eq!(allocations[0].quantity, 3);
        assert_eq!(allocations[1].lot_id, new.id);
        assert_eq!(allocations[1].quantity, 2);
    }

    #[test]
    fn test_fifo_shortfall_is_total_failure() {
        let lots = vec![lot_on(3, "100", 2024, 1, 1), lot_on(4, "100", 2024, 2, 1)];
        // 7 available, 10 requested: 3 uncovered, no partial allocation
        assert_eq!(allocate_fifo(&lots, 10), Err(3));
    }

    #[test]
    fn test_fifo_exact_coverage() {
        let lots = vec![lot_on(4, "100", 2024, 1, 1), lot_on(6, "100", 2024, 2, 1)];
        let allocations = allocate_fifo(&lots, 10).unwrap();
        let allocated: i64 = allocations.iter().map(|a| a.quantity).sum();
        assert_eq!(allocated, 10);
    }

    /// Critical at zero, Low within threshold, Normal above
    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(classify_stock_status(0, 5), StockStatus::Critical);
        assert_eq!(classify_stock_status(4, 5), StockStatus::Low);
        assert_eq!(classify_stock_status(5, 5), StockStatus::Low);
        assert_eq!(classify_stock_status(6, 5), StockStatus::Normal);
    }

    #[test]
    fn test_stock_status_display() {
        assert_eq!(StockStatus::Critical.to_string(), "Critical");
        assert_eq!(StockStatus::Low.to_string(), "Low Stock");
        assert_eq!(StockStatus::Normal.to_string(), "Normal");
    }

    #[test]
    fn test_lot_age_days() {
        let bought = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        assert_eq!(lot_age_days(bought, today), 45);
    }

    #[test]
    fn test_slow_moving_excludes_fresh_and_depleted() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let fresh = lot_on(5, "10", 2024, 2, 25);
        let aged = lot_on(5, "10", 2024, 1, 1);
        let mut depleted = lot_on(5, "10", 2023, 11, 1);
        depleted.quantity_available = 0;

        let report = slow_moving_lots(&[fresh, aged.clone(), depleted], today, 30, 10);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].id, aged.id);
    }

    #[test]
    fn test_slow_moving_sorted_oldest_first_and_capped() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let lots: Vec<StockLot> = (1..=12).map(|d| lot_on(1, "10", 2024, 3, d)).collect();

        let report = slow_moving_lots(&lots, today, 30, 10);
        assert_eq!(report.len(), 10);
        // Descending by age means ascending by purchase date
        for pair in report.windows(2) {
            assert!(pair[0].purchase_date <= pair[1].purchase_date);
        }
        assert_eq!(report[0].purchase_date, lots[0].purchase_date);
    }

    /// Exactly 30 days old is not yet slow-moving
    #[test]
    fn test_slow_moving_strict_threshold() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let lots = vec![lot_on(1, "10", 2024, 1, 1)];
        assert_eq!(lot_age_days(lots[0].purchase_date, today), 30);
        assert!(slow_moving_lots(&lots, today, 30, 10).is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for lot availabilities
    fn availability_strategy() -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(0i64..=500, 1..10)
    }

    fn lots_from(availabilities: &[i64]) -> Vec<StockLot> {
        availabilities
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                let mut lot = lot_on(a.max(1), "25", 2024, 1, (i as u32 % 28) + 1);
                lot.quantity_available = a;
                lot
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Allocations never exceed a lot's availability and sum to the
        /// requested quantity
        #[test]
        fn prop_fifo_allocations_bounded_and_exact(
            availabilities in availability_strategy(),
            requested in 1i64..=500
        ) {
            let lots = lots_from(&availabilities);
            let total: i64 = availabilities.iter().sum();

            match allocate_fifo(&lots, requested) {
                Ok(allocations) => {
                    prop_assert!(total >= requested);
                    let allocated: i64 = allocations.iter().map(|a| a.quantity).sum();
                    prop_assert_eq!(allocated, requested);

                    for allocation in &allocations {
                        let lot = lots.iter().find(|l| l.id == allocation.lot_id).unwrap();
                        prop_assert!(allocation.quantity >= 1);
                        prop_assert!(allocation.quantity <= lot.quantity_available);
                    }
                }
                Err(shortfall) => {
                    prop_assert_eq!(shortfall, requested - total);
                }
            }
        }

        /// A later lot is only touched once every earlier lot is exhausted
        #[test]
        fn prop_fifo_consumes_in_order(
            availabilities in availability_strategy(),
            requested in 1i64..=500
        ) {
            let lots = lots_from(&availabilities);

            if let Ok(allocations) = allocate_fifo(&lots, requested) {
                let mut last_index = 0;
                for allocation in &allocations {
                    let index = lots.iter().position(|l| l.id == allocation.lot_id).unwrap();
                    prop_assert!(index >= last_index);
                    // Every allocated lot before the last must be drained
                    if allocation.lot_id != allocations.last().unwrap().lot_id {
                        prop_assert_eq!(allocation.quantity, lots[index].quantity_available);
                    }
                    last_index = index;
                }
            }
        }

        /// Weighted average cost sits between the cheapest and priciest lot
        #[test]
        fn prop_average_cost_bounded(
            quantities in prop::collection::vec(1i64..=200, 2..8),
            costs in prop::collection::vec(1i64..=10_000, 2..8)
        ) {
            let len = quantities.len().min(costs.len());
            let lots: Vec<StockLot> = (0..len)
                .map(|i| {
                    let mut lot = lot_on(quantities[i], "1", 2024, 1, (i as u32 % 28) + 1);
                    lot.unit_cost = Decimal::new(costs[i], 2);
                    lot
                })
                .collect();

            let average = weighted_average_cost(&lots).unwrap();
            let min = lots.iter().map(|l| l.unit_cost).min().unwrap();
            let max = lots.iter().map(|l| l.unit_cost).max().unwrap();

            prop_assert!(average >= min);
            prop_assert!(average <= max);
        }

        /// Classification is total and consistent with its bounds
        #[test]
        fn prop_status_partitions(total in 0i64..=1000, threshold in 0i64..=100) {
            let status = classify_stock_status(total, threshold);
            match status {
                StockStatus::Critical => prop_assert_eq!(total, 0),
                StockStatus::Low => {
                    prop_assert!(total > 0);
                    prop_assert!(total <= threshold);
                }
                StockStatus::Normal => prop_assert!(total > threshold),
            }
        }

        /// The slow-moving report never exceeds its cap and only lists lots
        /// strictly older than the age floor
        #[test]
        fn prop_slow_moving_capped_and_aged(
            availabilities in availability_strategy(),
            min_age in 1i64..=60,
            cap in 1usize..=10
        ) {
            let lots = lots_from(&availabilities);
            let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

            let report = slow_moving_lots(&lots, today, min_age, cap);
            prop_assert!(report.len() <= cap);
            for lot in &report {
                prop_assert!(lot.quantity_available > 0);
                prop_assert!(lot_age_days(lot.purchase_date, today) > min_age);
            }
        }
    }
}
