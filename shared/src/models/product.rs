//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product tracked in inventory
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unit of sale (e.g. "piece", "box", "kg")
    pub unit: String,
    /// Current stock on hand
    pub quantity: i64,
    pub purchase_price: Decimal,
    /// Retail price, first tier
    pub price_detail_1: Decimal,
    /// Retail price, second tier
    pub price_detail_2: Decimal,
    pub price_wholesale: Decimal,
    /// Stock level at or below which the product is flagged as low
    pub low_stock_threshold: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sale price tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Detail1,
    Detail2,
    Wholesale,
}

impl PriceTier {
    pub fn price_for(&self, product: &Product) -> Decimal {
        match self {
            PriceTier::Detail1 => product.price_detail_1,
            PriceTier::Detail2 => product.price_detail_2,
            PriceTier::Wholesale => product.price_wholesale,
        }
    }
}

/// Derived stock level status for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Critical,
    Low,
    Normal,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Critical => "critical",
            StockStatus::Low => "low",
            StockStatus::Normal => "normal",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::Critical => write!(f, "Critical"),
            StockStatus::Low => write!(f, "Low Stock"),
            StockStatus::Normal => write!(f, "Normal"),
        }
    }
}

/// Classify a stock level against a low-stock threshold.
///
/// Critical when nothing is left, Low when at or below the threshold,
/// Normal otherwise.
pub fn classify_stock_status(total_quantity: i64, threshold: i64) -> StockStatus {
    if total_quantity <= 0 {
        StockStatus::Critical
    } else if total_quantity <= threshold {
        StockStatus::Low
    } else {
        StockStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stock_status() {
        assert_eq!(classify_stock_status(0, 5), StockStatus::Critical);
        assert_eq!(classify_stock_status(4, 5), StockStatus::Low);
        assert_eq!(classify_stock_status(5, 5), StockStatus::Low);
        assert_eq!(classify_stock_status(6, 5), StockStatus::Normal);
    }

    #[test]
    fn test_classify_with_zero_threshold() {
        // A zero threshold never reports Low, only Critical or Normal
        assert_eq!(classify_stock_status(0, 0), StockStatus::Critical);
        assert_eq!(classify_stock_status(1, 0), StockStatus::Normal);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StockStatus::Low.to_string(), "Low Stock");
        assert_eq!(StockStatus::Critical.to_string(), "Critical");
    }
}
