//! Sale management service: stock-debiting create/update/delete
//!
//! Every unit of work runs in one transaction. Stock debits are conditional
//! (`AND quantity >= $n`) so a concurrent writer can never drive a product
//! negative; a failed debit aborts the whole transaction, which also covers
//! the cross-product restore-then-report case.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::models::{LotConsumptionPolicy, MovementDirection, Sale};
use shared::validation::{validate_amount, validate_quantity};

use crate::error::{AppError, AppResult};
use crate::services::stock::{consume_lots_fifo, record_movement, restore_lots_for_sale};

/// Sale service for recording sales and keeping product stock consistent
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
    policy: LotConsumptionPolicy,
}

/// Input for creating a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub product_id: Uuid,
    pub client_id: Uuid,
    pub quantity: i64,
    pub total_amount: Decimal,
    pub sale_date: Option<NaiveDate>,
}

/// Input for updating a sale; omitted fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateSaleInput {
    pub product_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub quantity: Option<i64>,
    pub total_amount: Option<Decimal>,
    pub sale_date: Option<NaiveDate>,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool, policy: LotConsumptionPolicy) -> Self {
        Self { db, policy }
    }

    /// Record a sale, debiting the product's stock
    pub async fn create_sale(&self, user_id: Uuid, input: CreateSaleInput) -> AppResult<Sale> {
        validate_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_amount(input.total_amount).map_err(|msg| AppError::Validation {
            field: "total_amount".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let client_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(input.client_id)
                .fetch_one(&mut *tx)
                .await?;

        if !client_exists {
            return Err(AppError::NotFound("Client".to_string()));
        }

        let product_name = sqlx::query_scalar::<_, String>("SELECT name FROM products WHERE id = $1")
            .bind(input.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        debit_product(&mut tx, input.product_id, &product_name, input.quantity).await?;

        let sale_date = input.sale_date.unwrap_or_else(|| Utc::now().date_naive());

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (product_id, client_id, quantity, total_amount, sale_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, product_id, client_id, quantity, total_amount, sale_date,
                      created_by, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.client_id)
        .bind(input.quantity)
        .bind(input.total_amount)
        .bind(sale_date)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        match self.policy {
            LotConsumptionPolicy::ScalarOnly => {
                record_movement(
                    &mut tx,
                    input.product_id,
                    None,
                    MovementDirection::Out,
                    input.quantity,
                    "sale",
                    sale.id,
                )
                .await?;
            }
            LotConsumptionPolicy::Fifo => {
                consume_lots_fifo(
                    &mut tx,
                    input.product_id,
                    &product_name,
                    sale.id,
                    input.quantity,
                )
                .await?;
            }
        }

        tx.commit().await?;

        Ok(sale)
    }

    /// Update a sale, reconciling product stock with the changed quantity
    /// and/or product
    pub async fn update_sale(
        &self,
        sale_id: Uuid,
        input: UpdateSaleInput,
    ) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;

        let old = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, client_id, quantity, total_amount, sale_date,
                   created_by, created_at
            FROM sales
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let new_product_id = input.product_id.unwrap_or(old.product_id);
        let new_client_id = input.client_id.unwrap_or(old.client_id);
        let new_quantity = input.quantity.unwrap_or(old.quantity);
        let new_total = input.total_amount.unwrap_or(old.total_amount);
        let new_date = input.sale_date.unwrap_or(old.sale_date);

        validate_quantity(new_quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_amount(new_total).map_err(|msg| AppError::Validation {
            field: "total_amount".to_string(),
            message: msg.to_string(),
        })?;

        if new_client_id != old.client_id {
            let client_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                    .bind(new_client_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if !client_exists {
                return Err(AppError::NotFound("Client".to_string()));
            }
        }

        let product_changed = new_product_id != old.product_id;
        let quantity_changed = new_quantity != old.quantity;

        if product_changed || quantity_changed {
            let new_product_name =
                sqlx::query_scalar::<_, String>("SELECT name FROM products WHERE id = $1")
                    .bind(new_product_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            match self.policy {
                LotConsumptionPolicy::ScalarOnly => {
                    if product_changed {
                        // Restore the old product, then debit the new one.
                        // An uncovered debit aborts the transaction, which
                        // undoes the restoration.
                        credit_product(&mut tx, old.product_id, old.quantity).await?;
                        record_movement(
                            &mut tx,
                            old.product_id,
                            None,
                            MovementDirection::In,
                            old.quantity,
                            "sale",
                            old.id,
                        )
                        .await?;

                        debit_product(&mut tx, new_product_id, &new_product_name, new_quantity)
                            .await?;
                        record_movement(
                            &mut tx,
                            new_product_id,
                            None,
                            MovementDirection::Out,
                            new_quantity,
                            "sale",
                            old.id,
                        )
                        .await?;
                    } else {
                        let delta = new_quantity - old.quantity;
                        if delta > 0 {
                            debit_product(&mut tx, new_product_id, &new_product_name, delta)
                                .await?;
                            record_movement(
                                &mut tx,
                                new_product_id,
                                None,
                                MovementDirection::Out,
                                delta,
                                "sale",
                                old.id,
                            )
                            .await?;
                        } else {
                            credit_product(&mut tx, new_product_id, -delta).await?;
                            record_movement(
                                &mut tx,
                                new_product_id,
                                None,
                                MovementDirection::In,
                                -delta,
                                "sale",
                                old.id,
                            )
                            .await?;
                        }
                    }
                }
                LotConsumptionPolicy::Fifo => {
                    // Reverse the sale's prior consumption entirely, then
                    // re-consume at the new product/quantity. Handles the
                    // same-product and cross-product cases uniformly.
                    credit_product(&mut tx, old.product_id, old.quantity).await?;
                    restore_lots_for_sale(&mut tx, old.product_id, old.id).await?;

                    debit_product(&mut tx, new_product_id, &new_product_name, new_quantity)
                        .await?;
                    consume_lots_fifo(
                        &mut tx,
                        new_product_id,
                        &new_product_name,
                        old.id,
                        new_quantity,
                    )
                    .await?;
                }
            }
        }

        // Stock math succeeded; persist the document fields last
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET product_id = $1, client_id = $2, quantity = $3, total_amount = $4, sale_date = $5
            WHERE id = $6
            RETURNING id, product_id, client_id, quantity, total_amount, sale_date,
                      created_by, created_at
            "#,
        )
        .bind(new_product_id)
        .bind(new_client_id)
        .bind(new_quantity)
        .bind(new_total)
        .bind(new_date)
        .bind(sale_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(sale)
    }

    /// Delete a sale, crediting its quantity back to the product
    pub async fn delete_sale(&self, sale_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, client_id, quantity, total_amount, sale_date,
                   created_by, created_at
            FROM sales
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        // The stock credit must not be silently lost: a missing product
        // aborts the deletion as a reportable error.
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(sale.product_id)
                .fetch_one(&mut *tx)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        credit_product(&mut tx, sale.product_id, sale.quantity).await?;

        match self.policy {
            LotConsumptionPolicy::ScalarOnly => {
                record_movement(
                    &mut tx,
                    sale.product_id,
                    None,
                    MovementDirection::In,
                    sale.quantity,
                    "sale",
                    sale.id,
                )
                .await?;
            }
            LotConsumptionPolicy::Fifo => {
                restore_lots_for_sale(&mut tx, sale.product_id, sale.id).await?;
            }
        }

        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get a sale by id
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, client_id, quantity, total_amount, sale_date,
                   created_by, created_at
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        Ok(sale)
    }

    /// List all sales, newest first
    pub async fn list_sales(&self) -> AppResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, client_id, quantity, total_amount, sale_date,
                   created_by, created_at
            FROM sales
            ORDER BY sale_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }
}

/// Conditionally debit a product's stock; zero affected rows on an existing
/// product means the stock cannot cover the debit.
async fn debit_product(
    conn: &mut PgConnection,
    product_id: Uuid,
    product_name: &str,
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
        return Err(AppError::InsufficientStock(format!(
            "Not enough stock of {} to cover {} units",
            product_name, quantity
        )));
    }

    Ok(())
}

/// Credit a product's stock (no upper bound)
async fn credit_product(conn: &mut PgConnection, product_id: Uuid, quantity: i64) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity + $1, updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
