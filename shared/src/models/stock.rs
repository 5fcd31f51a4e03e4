//! Stock lot and movement models, plus the pure ledger math
//!
//! Everything that decides *how much moves where* lives here as plain
//! functions over in-memory rows, so the rules are testable without a
//! database. The backend services feed these functions rows loaded inside a
//! transaction and persist the result.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A discrete batch of stock received by a purchase
///
/// `quantity_available` only ever decreases through consumption and never
/// goes negative. Lots that reach zero stay in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockLot {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Purchase that materialized this lot, if it still exists
    pub purchase_id: Option<Uuid>,
    pub quantity_received: i64,
    pub quantity_available: i64,
    pub unit_cost: Decimal,
    pub purchase_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MovementDirection::In),
            "out" => Some(MovementDirection::Out),
            _ => None,
        }
    }
}

/// Append-only audit record of a stock mutation
///
/// Movements are never updated or deleted; reversals append compensating
/// entries in the opposite direction.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Lot the movement touched, when lot-level tracking applies
    pub lot_id: Option<Uuid>,
    pub direction: MovementDirection,
    pub quantity: i64,
    /// Originating document kind ("sale" or "purchase")
    pub reference_type: String,
    pub reference_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// How sales consume stock lots
///
/// `ScalarOnly` reproduces the legacy behavior: sales debit only the
/// product's scalar quantity and lots are purchase-side metadata, free to
/// drift from the scalar total. `Fifo` additionally consumes lots
/// oldest-first and keeps `product.quantity == SUM(quantity_available)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotConsumptionPolicy {
    #[default]
    ScalarOnly,
    Fifo,
}

/// One lot's share of a FIFO allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotAllocation {
    pub lot_id: Uuid,
    pub quantity: i64,
}

/// Allocate `quantity` across lots oldest-first.
///
/// `lots` must already be sorted oldest-first (purchase_date, then
/// created_at); lots with nothing available are skipped. Returns the per-lot
/// allocations, or the uncovered shortfall when the lots cannot satisfy the
/// request. No partial allocation is ever returned on shortfall.
pub fn allocate_fifo(lots: &[StockLot], quantity: i64) -> Result<Vec<LotAllocation>, i64> {
    let mut remaining = quantity;
    let mut allocations = Vec::new();

    for lot in lots {
        if remaining == 0 {
            break;
        }
        if lot.quantity_available <= 0 {
            continue;
        }
        let take = remaining.min(lot.quantity_available);
        allocations.push(LotAllocation {
            lot_id: lot.id,
            quantity: take,
        });
        remaining -= take;
    }

    if remaining > 0 {
        Err(remaining)
    } else {
        Ok(allocations)
    }
}

/// Quantity-weighted mean unit cost across lots that still have stock.
///
/// Returns `None` when no lot has availability, since an average cost of an
/// empty holding is meaningless.
pub fn weighted_average_cost(lots: &[StockLot]) -> Option<Decimal> {
    let mut total_quantity = Decimal::ZERO;
    let mut total_value = Decimal::ZERO;

    for lot in lots {
        if lot.quantity_available <= 0 {
            continue;
        }
        let qty = Decimal::from(lot.quantity_available);
        total_quantity += qty;
        total_value += qty * lot.unit_cost;
    }

    if total_quantity > Decimal::ZERO {
        Some(total_value / total_quantity)
    } else {
        None
    }
}

/// Age of a lot in days as of `today`
pub fn lot_age_days(purchase_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - purchase_date).num_days()
}

/// Lots with remaining stock older than `min_age_days`, oldest first,
/// capped to `cap` entries — the slow-moving inventory report.
pub fn slow_moving_lots(
    lots: &[StockLot],
    today: NaiveDate,
    min_age_days: i64,
    cap: usize,
) -> Vec<StockLot> {
    let mut aged: Vec<StockLot> = lots
        .iter()
        .filter(|l| l.quantity_available > 0 && lot_age_days(l.purchase_date, today) > min_age_days)
        .cloned()
        .collect();

    aged.sort_by(|a, b| {
        lot_age_days(b.purchase_date, today)
            .cmp(&lot_age_days(a.purchase_date, today))
            .then(a.created_at.cmp(&b.created_at))
    });
    aged.truncate(cap);
    aged
}
