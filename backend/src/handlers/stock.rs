//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{ProductStockSummary, SlowMovingLot, StockService};
use crate::models::{StockLot, StockMovement};
use crate::AppState;

/// Query parameters for the slow-moving report
#[derive(Debug, Deserialize)]
pub struct SlowMovingQuery {
    pub days: Option<i64>,
    pub limit: Option<usize>,
}

/// Aggregated lot view for a product
pub async fn get_product_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductStockSummary>> {
    let service = StockService::new(state.db);
    let summary = service.get_product_stock(product_id).await?;
    Ok(Json(summary))
}

/// Aggregated lot view for every product
pub async fn get_stock_overview(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductStockSummary>>> {
    let service = StockService::new(state.db);
    let overview = service.stock_overview().await?;
    Ok(Json(overview))
}

/// Slow-moving inventory report
pub async fn get_slow_moving(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<SlowMovingQuery>,
) -> AppResult<Json<Vec<SlowMovingLot>>> {
    let service = StockService::new(state.db);
    let days = query.days.unwrap_or(state.config.stock.slow_moving_days);
    let limit = query.limit.unwrap_or(10);
    let report = service.slow_moving(days, limit).await?;
    Ok(Json(report))
}

/// List a product's stock lots
pub async fn list_product_lots(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockLot>>> {
    let service = StockService::new(state.db);
    let lots = service.list_lots(product_id).await?;
    Ok(Json(lots))
}

/// List a product's movement ledger
pub async fn list_product_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.db);
    let movements = service.list_movements(product_id).await?;
    Ok(Json(movements))
}
