//! Purchasing models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded purchase of a product from a supplier
///
/// Creating a purchase credits the product's stock and materializes a stock
/// lot carrying the landed unit cost.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub product_id: Uuid,
    pub supplier_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub purchase_date: NaiveDate,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
