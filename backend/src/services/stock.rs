//! Stock ledger service: lot aggregation, aging reports, and the movement
//! ledger primitives shared by the sale and purchase adjustment paths
//!
//! Movements are append-only. Reversals (sale update/delete) are recorded as
//! compensating IN entries; the net per-lot consumption of a sale is
//! recovered by summing its movements.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::models::{
    allocate_fifo, classify_stock_status, lot_age_days, slow_moving_lots, weighted_average_cost,
    MovementDirection, StockLot, StockMovement, StockStatus,
};

use crate::error::{AppError, AppResult};

/// Stock ledger service for lot aggregation and movement history
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Aggregated lot view for one product
#[derive(Debug, Clone, Serialize)]
pub struct ProductStockSummary {
    pub product_id: Uuid,
    pub product_name: String,
    /// Sum of `quantity_available` across the product's lots
    pub total_quantity: i64,
    /// Number of lots that still hold stock
    pub batch_count: i64,
    /// Quantity-weighted mean unit cost of lots with stock
    pub average_cost: Option<Decimal>,
    pub oldest_lot_date: Option<NaiveDate>,
    pub newest_lot_date: Option<NaiveDate>,
    pub stock_status: StockStatus,
}

/// One entry of the slow-moving inventory report
#[derive(Debug, Clone, Serialize)]
pub struct SlowMovingLot {
    #[serde(flatten)]
    pub lot: StockLot,
    pub product_name: String,
    pub days_old: i64,
}

/// Row for lot queries joined with the product name
#[derive(Debug, sqlx::FromRow)]
struct LotWithProductRow {
    id: Uuid,
    product_id: Uuid,
    purchase_id: Option<Uuid>,
    quantity_received: i64,
    quantity_available: i64,
    unit_cost: Decimal,
    purchase_date: NaiveDate,
    created_at: chrono::DateTime<Utc>,
    product_name: String,
}

impl LotWithProductRow {
    fn into_lot(self) -> (StockLot, String) {
        (
            StockLot {
                id: self.id,
                product_id: self.product_id,
                purchase_id: self.purchase_id,
                quantity_received: self.quantity_received,
                quantity_available: self.quantity_available,
                unit_cost: self.unit_cost,
                purchase_date: self.purchase_date,
                created_at: self.created_at,
            },
            self.product_name,
        )
    }
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Aggregated lot view for a single product
    pub async fn get_product_stock(&self, product_id: Uuid) -> AppResult<ProductStockSummary> {
        let product = sqlx::query_as::<_, (String, i64)>(
            "SELECT name, low_stock_threshold FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT id, product_id, purchase_id, quantity_received, quantity_available,
                   unit_cost, purchase_date, created_at
            FROM stock_lots
            WHERE product_id = $1
            ORDER BY purchase_date ASC, created_at ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(summarize(product_id, product.0, product.1, &lots))
    }

    /// Aggregated lot view for every product
    pub async fn stock_overview(&self) -> AppResult<Vec<ProductStockSummary>> {
        let products = sqlx::query_as::<_, (Uuid, String, i64)>(
            "SELECT id, name, low_stock_threshold FROM products ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT id, product_id, purchase_id, quantity_received, quantity_available,
                   unit_cost, purchase_date, created_at
            FROM stock_lots
            ORDER BY purchase_date ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_product: std::collections::HashMap<Uuid, Vec<StockLot>> =
            std::collections::HashMap::new();
        for lot in lots {
            by_product.entry(lot.product_id).or_default().push(lot);
        }

        Ok(products
            .into_iter()
            .map(|(id, name, threshold)| {
                let lots = by_product.remove(&id).unwrap_or_default();
                summarize(id, name, threshold, &lots)
            })
            .collect())
    }

    /// Slow-moving inventory: lots with stock older than `min_age_days`,
    /// oldest first, capped to `cap` entries
    pub async fn slow_moving(&self, min_age_days: i64, cap: usize) -> AppResult<Vec<SlowMovingLot>> {
        let rows = sqlx::query_as::<_, LotWithProductRow>(
            r#"
            SELECT l.id, l.product_id, l.purchase_id, l.quantity_received,
                   l.quantity_available, l.unit_cost, l.purchase_date, l.created_at,
                   p.name AS product_name
            FROM stock_lots l
            JOIN products p ON p.id = l.product_id
            WHERE l.quantity_available > 0
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let today = Utc::now().date_naive();
        let mut names = std::collections::HashMap::new();
        let mut lots = Vec::with_capacity(rows.len());
        for row in rows {
            let (lot, name) = row.into_lot();
            names.insert(lot.id, name);
            lots.push(lot);
        }

        Ok(slow_moving_lots(&lots, today, min_age_days, cap)
            .into_iter()
            .map(|lot| SlowMovingLot {
                days_old: lot_age_days(lot.purchase_date, today),
                product_name: names.remove(&lot.id).unwrap_or_default(),
                lot,
            })
            .collect())
    }

    /// List a product's lots, oldest first
    pub async fn list_lots(&self, product_id: Uuid) -> AppResult<Vec<StockLot>> {
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let lots = sqlx::query_as::<_, StockLot>(
            r#"
            SELECT id, product_id, purchase_id, quantity_received, quantity_available,
                   unit_cost, purchase_date, created_at
            FROM stock_lots
            WHERE product_id = $1
            ORDER BY purchase_date ASC, created_at ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lots)
    }

    /// List a product's movement ledger, newest first
    pub async fn list_movements(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, lot_id, direction, quantity, reference_type,
                   reference_id, created_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }
}

fn summarize(
    product_id: Uuid,
    product_name: String,
    threshold: i64,
    lots: &[StockLot],
) -> ProductStockSummary {
    let with_stock: Vec<&StockLot> = lots.iter().filter(|l| l.quantity_available > 0).collect();
    let total_quantity: i64 = with_stock.iter().map(|l| l.quantity_available).sum();

    ProductStockSummary {
        product_id,
        product_name,
        total_quantity,
        batch_count: with_stock.len() as i64,
        average_cost: weighted_average_cost(lots),
        oldest_lot_date: with_stock.iter().map(|l| l.purchase_date).min(),
        newest_lot_date: with_stock.iter().map(|l| l.purchase_date).max(),
        stock_status: classify_stock_status(total_quantity, threshold),
    }
}

// ============================================================================
// Ledger primitives used inside sale/purchase transactions
// ============================================================================

/// Append a movement to the audit ledger
pub(crate) async fn record_movement(
    conn: &mut PgConnection,
    product_id: Uuid,
    lot_id: Option<Uuid>,
    direction: MovementDirection,
    quantity: i64,
    reference_type: &str,
    reference_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (product_id, lot_id, direction, quantity, reference_type, reference_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(product_id)
    .bind(lot_id)
    .bind(direction.as_str())
    .bind(quantity)
    .bind(reference_type)
    .bind(reference_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Consume `quantity` of a product's lots oldest-first on behalf of a sale,
/// recording one OUT movement per consumed lot.
///
/// Locks the candidate lots, allocates with the pure FIFO rule, and fails
/// with `InsufficientStock` on shortfall, aborting the caller's transaction.
pub(crate) async fn consume_lots_fifo(
    conn: &mut PgConnection,
    product_id: Uuid,
    product_name: &str,
    sale_id: Uuid,
    quantity: i64,
) -> AppResult<()> {
    let lots = sqlx::query_as::<_, StockLot>(
        r#"
        SELECT id, product_id, purchase_id, quantity_received, quantity_available,
               unit_cost, purchase_date, created_at
        FROM stock_lots
        WHERE product_id = $1 AND quantity_available > 0
        ORDER BY purchase_date ASC, created_at ASC
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut *conn)
    .await?;

    let allocations = allocate_fifo(&lots, quantity).map_err(|shortfall| {
        AppError::InsufficientStock(format!(
            "Lots of {} cover {} of {} requested units",
            product_name,
            quantity - shortfall,
            quantity
        ))
    })?;

    for allocation in allocations {
        let updated = sqlx::query(
            r#"
            UPDATE stock_lots
            SET quantity_available = quantity_available - $1
            WHERE id = $2 AND quantity_available >= $1
            "#,
        )
        .bind(allocation.quantity)
        .bind(allocation.lot_id)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            // Lots are locked above; a miss here means the allocation is stale
            return Err(AppError::Internal(
                "lot availability changed during allocation".to_string(),
            ));
        }

        record_movement(
            &mut *conn,
            product_id,
            Some(allocation.lot_id),
            MovementDirection::Out,
            allocation.quantity,
            "sale",
            sale_id,
        )
        .await?;
    }

    Ok(())
}

/// Reverse a sale's net lot consumption, crediting each lot back and
/// recording compensating IN movements. The ledger itself is never mutated.
pub(crate) async fn restore_lots_for_sale(
    conn: &mut PgConnection,
    product_id: Uuid,
    sale_id: Uuid,
) -> AppResult<()> {
    let consumed = sqlx::query_as::<_, (Uuid, i64)>(
        r#"
        SELECT lot_id,
               SUM(CASE WHEN direction = 'out' THEN quantity ELSE -quantity END)::bigint AS consumed
        FROM stock_movements
        WHERE reference_type = 'sale' AND reference_id = $1 AND lot_id IS NOT NULL
        GROUP BY lot_id
        HAVING SUM(CASE WHEN direction = 'out' THEN quantity ELSE -quantity END) > 0
        "#,
    )
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    for (lot_id, quantity) in consumed {
        sqlx::query(
            "UPDATE stock_lots SET quantity_available = quantity_available + $1 WHERE id = $2",
        )
        .bind(quantity)
        .bind(lot_id)
        .execute(&mut *conn)
        .await?;

        record_movement(
            &mut *conn,
            product_id,
            Some(lot_id),
            MovementDirection::In,
            quantity,
            "sale",
            sale_id,
        )
        .await?;
    }

    Ok(())
}
