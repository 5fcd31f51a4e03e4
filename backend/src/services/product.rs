//! Product catalog service
//!
//! Stock quantity only ever moves through sale/purchase documents; product
//! updates cover the descriptive and pricing fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{classify_stock_status, Product, StockStatus};
use shared::validation::{
    validate_name, validate_price, validate_quantity, validate_threshold, validate_unit,
};

use crate::error::{AppError, AppResult};

/// Product service for catalog management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub unit: String,
    /// Opening stock; defaults to zero
    pub initial_quantity: Option<i64>,
    pub purchase_price: Decimal,
    pub price_detail_1: Decimal,
    pub price_detail_2: Decimal,
    pub price_wholesale: Decimal,
    pub low_stock_threshold: i64,
}

/// Input for updating a product; omitted fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub price_detail_1: Option<Decimal>,
    pub price_detail_2: Option<Decimal>,
    pub price_wholesale: Option<Decimal>,
    pub low_stock_threshold: Option<i64>,
}

/// Product enriched with its derived stock status
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithStatus {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
}

impl From<Product> for ProductWithStatus {
    fn from(product: Product) -> Self {
        let stock_status = classify_stock_status(product.quantity, product.low_stock_threshold);
        Self {
            product,
            stock_status,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, unit, quantity, purchase_price, price_detail_1, \
                               price_detail_2, price_wholesale, low_stock_threshold, \
                               created_by, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product
    pub async fn create_product(
        &self,
        user_id: Uuid,
        input: CreateProductInput,
    ) -> AppResult<ProductWithStatus> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit(&input.unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
        validate_threshold(input.low_stock_threshold).map_err(|msg| AppError::Validation {
            field: "low_stock_threshold".to_string(),
            message: msg.to_string(),
        })?;
        for (field, price) in [
            ("purchase_price", input.purchase_price),
            ("price_detail_1", input.price_detail_1),
            ("price_detail_2", input.price_detail_2),
            ("price_wholesale", input.price_wholesale),
        ] {
            validate_price(price).map_err(|msg| AppError::Validation {
                field: field.to_string(),
                message: msg.to_string(),
            })?;
        }

        let initial_quantity = input.initial_quantity.unwrap_or(0);
        if initial_quantity > 0 {
            validate_quantity(initial_quantity).map_err(|msg| AppError::Validation {
                field: "initial_quantity".to_string(),
                message: msg.to_string(),
            })?;
        } else if initial_quantity < 0 {
            return Err(AppError::Validation {
                field: "initial_quantity".to_string(),
                message: "Opening stock cannot be negative".to_string(),
            });
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, unit, quantity, purchase_price, price_detail_1,
                                  price_detail_2, price_wholesale, low_stock_threshold, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(input.unit.trim())
        .bind(initial_quantity)
        .bind(input.purchase_price)
        .bind(input.price_detail_1)
        .bind(input.price_detail_2)
        .bind(input.price_wholesale)
        .bind(input.low_stock_threshold)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(product.into())
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<ProductWithStatus> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(product.into())
    }

    /// List all products
    pub async fn list_products(&self) -> AppResult<Vec<ProductWithStatus>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(products.into_iter().map(Into::into).collect())
    }

    /// List products at or below their low-stock threshold
    pub async fn list_low_stock(&self) -> AppResult<Vec<ProductWithStatus>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE quantity <= low_stock_threshold ORDER BY quantity, name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(products.into_iter().map(Into::into).collect())
    }

    /// Update a product's descriptive and pricing fields
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductWithStatus> {
        let existing = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        let unit = input.unit.unwrap_or(existing.unit);
        let purchase_price = input.purchase_price.unwrap_or(existing.purchase_price);
        let price_detail_1 = input.price_detail_1.unwrap_or(existing.price_detail_1);
        let price_detail_2 = input.price_detail_2.unwrap_or(existing.price_detail_2);
        let price_wholesale = input.price_wholesale.unwrap_or(existing.price_wholesale);
        let low_stock_threshold = input
            .low_stock_threshold
            .unwrap_or(existing.low_stock_threshold);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit(&unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
        validate_threshold(low_stock_threshold).map_err(|msg| AppError::Validation {
            field: "low_stock_threshold".to_string(),
            message: msg.to_string(),
        })?;
        for (field, price) in [
            ("purchase_price", purchase_price),
            ("price_detail_1", price_detail_1),
            ("price_detail_2", price_detail_2),
            ("price_wholesale", price_wholesale),
        ] {
            validate_price(price).map_err(|msg| AppError::Validation {
                field: field.to_string(),
                message: msg.to_string(),
            })?;
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $1, unit = $2, purchase_price = $3, price_detail_1 = $4,
                price_detail_2 = $5, price_wholesale = $6, low_stock_threshold = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(name.trim())
        .bind(unit.trim())
        .bind(purchase_price)
        .bind(price_detail_1)
        .bind(price_detail_2)
        .bind(price_wholesale)
        .bind(low_stock_threshold)
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(product.into())
    }

    /// Delete a product
    ///
    /// Refused while sales, purchases, or stock lots still reference it.
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM sales WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM purchases WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM stock_lots WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Product is referenced by sales, purchases, or stock lots".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}
