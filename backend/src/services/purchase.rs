//! Purchase management service: stock-crediting create/update/delete, lot
//! materialization, and CSV bulk import
//!
//! Each purchase materializes a stock lot carrying the landed unit cost.
//! Reducing or deleting a purchase whose units were already consumed is a
//! genuine conflict and must fail rather than clamp.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::models::{MovementDirection, Purchase};
use shared::types::ImportSummary;
use shared::validation::{validate_amount, validate_quantity};

use crate::error::{AppError, AppResult};
use crate::services::stock::record_movement;

/// Purchase service for recording purchases and stock lots
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// Input for creating a purchase
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    pub quantity: i64,
    pub total_amount: Decimal,
    pub purchase_date: Option<NaiveDate>,
}

/// Input for updating a purchase; omitted fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseInput {
    pub product_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub quantity: Option<i64>,
    pub total_amount: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
}

/// One row of a purchase import CSV
#[derive(Debug, Deserialize)]
struct PurchaseCsvRow {
    product_id: Uuid,
    supplier_id: Uuid,
    quantity: i64,
    total_amount: Decimal,
    purchase_date: Option<NaiveDate>,
}

/// Row describing a purchase's originating lot
#[derive(Debug, sqlx::FromRow)]
struct PurchaseLotRow {
    id: Uuid,
    quantity_received: i64,
    quantity_available: i64,
}

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a purchase, crediting the product's stock and materializing a
    /// stock lot
    pub async fn create_purchase(
        &self,
        user_id: Uuid,
        input: CreatePurchaseInput,
    ) -> AppResult<Purchase> {
        validate_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_amount(input.total_amount).map_err(|msg| AppError::Validation {
            field: "total_amount".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&mut *tx)
                .await?;

        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&mut *tx)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let unit_price = input.total_amount / Decimal::from(input.quantity);
        let purchase_date = input.purchase_date.unwrap_or_else(|| Utc::now().date_naive());

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (product_id, supplier_id, quantity, unit_price, total_amount,
                                   purchase_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, product_id, supplier_id, quantity, unit_price, total_amount,
                      purchase_date, created_by, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.supplier_id)
        .bind(input.quantity)
        .bind(unit_price)
        .bind(input.total_amount)
        .bind(purchase_date)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // Credit stock; purchases have no upper bound
        sqlx::query(
            "UPDATE products SET quantity = quantity + $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(input.quantity)
        .bind(input.product_id)
        .execute(&mut *tx)
        .await?;

        let lot_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO stock_lots (product_id, purchase_id, quantity_received,
                                    quantity_available, unit_cost, purchase_date)
            VALUES ($1, $2, $3, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.product_id)
        .bind(purchase.id)
        .bind(input.quantity)
        .bind(unit_price)
        .bind(purchase_date)
        .fetch_one(&mut *tx)
        .await?;

        record_movement(
            &mut tx,
            input.product_id,
            Some(lot_id),
            MovementDirection::In,
            input.quantity,
            "purchase",
            purchase.id,
        )
        .await?;

        tx.commit().await?;

        Ok(purchase)
    }

    /// Update a purchase, reconciling product stock and the originating lot
    pub async fn update_purchase(
        &self,
        purchase_id: Uuid,
        input: UpdatePurchaseInput,
    ) -> AppResult<Purchase> {
        let mut tx = self.db.begin().await?;

        let old = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, product_id, supplier_id, quantity, unit_price, total_amount,
                   purchase_date, created_by, created_at
            FROM purchases
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let new_product_id = input.product_id.unwrap_or(old.product_id);
        let new_supplier_id = input.supplier_id.unwrap_or(old.supplier_id);
        let new_quantity = input.quantity.unwrap_or(old.quantity);
        let new_total = input.total_amount.unwrap_or(old.total_amount);
        let new_date = input.purchase_date.unwrap_or(old.purchase_date);

        validate_quantity(new_quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_amount(new_total).map_err(|msg| AppError::Validation {
            field: "total_amount".to_string(),
            message: msg.to_string(),
        })?;

        if new_supplier_id != old.supplier_id {
            let supplier_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)",
            )
            .bind(new_supplier_id)
            .fetch_one(&mut *tx)
            .await?;

            if !supplier_exists {
                return Err(AppError::NotFound("Supplier".to_string()));
            }
        }

        let product_changed = new_product_id != old.product_id;
        let quantity_changed = new_quantity != old.quantity;
        let new_unit_price = new_total / Decimal::from(new_quantity);

        if product_changed || quantity_changed {
            if product_changed {
                let new_product_exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
                )
                .bind(new_product_id)
                .fetch_one(&mut *tx)
                .await?;

                if !new_product_exists {
                    return Err(AppError::NotFound("Product".to_string()));
                }

                // Take the purchased units back from the old product. If
                // sales already consumed them the debit cannot be covered
                // and the update fails.
                debit_purchased_stock(&mut tx, old.product_id, old.quantity).await?;
                credit_product_stock(&mut tx, new_product_id, new_quantity).await?;
            } else {
                let delta = new_quantity - old.quantity;
                if delta > 0 {
                    credit_product_stock(&mut tx, new_product_id, delta).await?;
                } else {
                    // new_stock = current - old + new must stay >= 0
                    debit_purchased_stock(&mut tx, new_product_id, -delta).await?;
                }
            }
        }

        // Re-point/resize the originating lot under the same guard
        let lot = sqlx::query_as::<_, PurchaseLotRow>(
            r#"
            SELECT id, quantity_received, quantity_available
            FROM stock_lots
            WHERE purchase_id = $1
            FOR UPDATE
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(lot) = lot {
            if product_changed && lot.quantity_available != lot.quantity_received {
                return Err(AppError::Conflict {
                    resource: "purchase".to_string(),
                    message: "Cannot move a purchase whose lot was already partially consumed"
                        .to_string(),
                });
            }

            let delta = new_quantity - old.quantity;
            let updated = sqlx::query(
                r#"
                UPDATE stock_lots
                SET product_id = $1, quantity_received = $2,
                    quantity_available = quantity_available + $3,
                    unit_cost = $4, purchase_date = $5
                WHERE id = $6 AND quantity_available + $3 >= 0
                "#,
            )
            .bind(new_product_id)
            .bind(new_quantity)
            .bind(delta)
            .bind(new_unit_price)
            .bind(new_date)
            .bind(lot.id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::Conflict {
                    resource: "purchase".to_string(),
                    message: "Purchased units were already consumed; cannot reduce below the consumed quantity".to_string(),
                });
            }

            if product_changed {
                record_movement(
                    &mut tx,
                    old.product_id,
                    Some(lot.id),
                    MovementDirection::Out,
                    old.quantity,
                    "purchase",
                    old.id,
                )
                .await?;
                record_movement(
                    &mut tx,
                    new_product_id,
                    Some(lot.id),
                    MovementDirection::In,
                    new_quantity,
                    "purchase",
                    old.id,
                )
                .await?;
            } else if quantity_changed {
                let delta = new_quantity - old.quantity;
                let (direction, magnitude) = if delta > 0 {
                    (MovementDirection::In, delta)
                } else {
                    (MovementDirection::Out, -delta)
                };
                record_movement(
                    &mut tx,
                    new_product_id,
                    Some(lot.id),
                    direction,
                    magnitude,
                    "purchase",
                    old.id,
                )
                .await?;
            }
        }

        // Stock math succeeded; persist the document fields last
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            UPDATE purchases
            SET product_id = $1, supplier_id = $2, quantity = $3, unit_price = $4,
                total_amount = $5, purchase_date = $6
            WHERE id = $7
            RETURNING id, product_id, supplier_id, quantity, unit_price, total_amount,
                      purchase_date, created_by, created_at
            "#,
        )
        .bind(new_product_id)
        .bind(new_supplier_id)
        .bind(new_quantity)
        .bind(new_unit_price)
        .bind(new_total)
        .bind(new_date)
        .bind(purchase_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(purchase)
    }

    /// Delete a purchase, debiting its quantity from the product
    ///
    /// Fails with a conflict when the purchased units were already sold:
    /// the stock cannot go negative, and clamping would hide real data.
    pub async fn delete_purchase(&self, purchase_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, product_id, supplier_id, quantity, unit_price, total_amount,
                   purchase_date, created_by, created_at
            FROM purchases
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - $1, updated_at = NOW()
            WHERE id = $2 AND quantity >= $1
            "#,
        )
        .bind(purchase.quantity)
        .bind(purchase.product_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict {
                resource: "purchase".to_string(),
                message: "Purchased units were already sold; deleting would drive stock negative"
                    .to_string(),
            });
        }

        // The originating lot goes with the purchase, but only untouched:
        // consumed lots are history and block the deletion.
        let lot = sqlx::query_as::<_, PurchaseLotRow>(
            r#"
            SELECT id, quantity_received, quantity_available
            FROM stock_lots
            WHERE purchase_id = $1
            FOR UPDATE
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(lot) = lot {
            if lot.quantity_available != lot.quantity_received {
                return Err(AppError::Conflict {
                    resource: "purchase".to_string(),
                    message: "Cannot delete a purchase whose lot was already partially consumed"
                        .to_string(),
                });
            }

            sqlx::query("DELETE FROM stock_lots WHERE id = $1")
                .bind(lot.id)
                .execute(&mut *tx)
                .await?;
        }

        record_movement(
            &mut tx,
            purchase.product_id,
            None,
            MovementDirection::Out,
            purchase.quantity,
            "purchase",
            purchase.id,
        )
        .await?;

        sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Bulk import purchases from CSV data
    ///
    /// Each row goes through the same `create_purchase` contract in its own
    /// transaction; a bad row is recorded and never aborts the batch.
    pub async fn import_purchases(&self, user_id: Uuid, data: &[u8]) -> AppResult<ImportSummary> {
        let mut reader = csv::Reader::from_reader(data);
        let mut summary = ImportSummary::default();

        for (index, record) in reader.deserialize::<PurchaseCsvRow>().enumerate() {
            let row_number = index + 1;
            match record {
                Ok(row) => {
                    let input = CreatePurchaseInput {
                        product_id: row.product_id,
                        supplier_id: row.supplier_id,
                        quantity: row.quantity,
                        total_amount: row.total_amount,
                        purchase_date: row.purchase_date,
                    };
                    match self.create_purchase(user_id, input).await {
                        Ok(_) => summary.record_success(),
                        Err(err) => summary.record_error(row_number, err),
                    }
                }
                Err(err) => summary.record_error(row_number, err),
            }
        }

        Ok(summary)
    }

    /// Get a purchase by id
    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<Purchase> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, product_id, supplier_id, quantity, unit_price, total_amount,
                   purchase_date, created_by, created_at
            FROM purchases
            WHERE id = $1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        Ok(purchase)
    }

    /// List all purchases, newest first
    pub async fn list_purchases(&self) -> AppResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, product_id, supplier_id, quantity, unit_price, total_amount,
                   purchase_date, created_by, created_at
            FROM purchases
            ORDER BY purchase_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(purchases)
    }
}

/// Conditionally take previously purchased units back out of stock; failing
/// means sales already consumed them.
async fn debit_purchased_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i64,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity - $1, updated_at = NOW()
        WHERE id = $2 AND quantity >= $1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InsufficientStock(
            "Purchased units were already consumed by sales".to_string(),
        ));
    }

    Ok(())
}

/// Credit a product's stock (no upper bound)
async fn credit_product_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i64,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE products SET quantity = quantity + $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
