//! HTTP handlers for client endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::client::{ClientService, CreateClientInput, UpdateClientInput};
use crate::models::Client;
use crate::AppState;

/// Create a client
pub async fn create_client(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateClientInput>,
) -> AppResult<Json<Client>> {
    let service = ClientService::new(state.db);
    let client = service.create_client(current_user.0.user_id, input).await?;
    Ok(Json(client))
}

/// Get a client by id
pub async fn get_client(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<Client>> {
    let service = ClientService::new(state.db);
    let client = service.get_client(client_id).await?;
    Ok(Json(client))
}

/// List all clients
pub async fn list_clients(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Client>>> {
    let service = ClientService::new(state.db);
    let clients = service.list_clients().await?;
    Ok(Json(clients))
}

/// Update a client
pub async fn update_client(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(client_id): Path<Uuid>,
    Json(input): Json<UpdateClientInput>,
) -> AppResult<Json<Client>> {
    let service = ClientService::new(state.db);
    let client = service.update_client(client_id, input).await?;
    Ok(Json(client))
}

/// Delete a client
pub async fn delete_client(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ClientService::new(state.db);
    service.delete_client(client_id).await?;
    Ok(Json(()))
}
