//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{CreateSaleInput, SaleService, UpdateSaleInput};
use crate::models::Sale;
use crate::AppState;

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db, state.config.stock.lot_consumption);
    let sale = service.create_sale(current_user.0.user_id, input).await?;
    Ok(Json(sale))
}

/// Get a sale by id
pub async fn get_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db, state.config.stock.lot_consumption);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// List all sales
pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db, state.config.stock.lot_consumption);
    let sales = service.list_sales().await?;
    Ok(Json(sales))
}

/// Update a sale
pub async fn update_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db, state.config.stock.lot_consumption);
    let sale = service.update_sale(sale_id, input).await?;
    Ok(Json(sale))
}

/// Delete a sale, crediting its stock back
pub async fn delete_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SaleService::new(state.db, state.config.stock.lot_consumption);
    service.delete_sale(sale_id).await?;
    Ok(Json(()))
}
