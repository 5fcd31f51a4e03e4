//! Client (customer) management service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::Client;
use shared::validation::{validate_email, validate_name, validate_phone};

use crate::error::{AppError, AppResult};

/// Client service for customer records
#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

/// Input for creating a client
#[derive(Debug, Deserialize)]
pub struct CreateClientInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a client; omitted fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

const CLIENT_COLUMNS: &str =
    "id, name, email, phone, address, created_by, created_at, updated_at";

fn validate_contact(email: &Option<String>, phone: &Option<String>) -> AppResult<()> {
    if let Some(email) = email {
        validate_email(email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
    }
    if let Some(phone) = phone {
        validate_phone(phone).map_err(|msg| AppError::Validation {
            field: "phone".to_string(),
            message: msg.to_string(),
        })?;
    }
    Ok(())
}

impl ClientService {
    /// Create a new ClientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a client
    pub async fn create_client(&self, user_id: Uuid, input: CreateClientInput) -> AppResult<Client> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_contact(&input.email, &input.phone)?;

        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (name, email, phone, address, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(client)
    }

    /// Get a client by id
    pub async fn get_client(&self, client_id: Uuid) -> AppResult<Client> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(client)
    }

    /// List all clients
    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clients ORDER BY name",
            CLIENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(clients)
    }

    /// Update a client
    pub async fn update_client(
        &self,
        client_id: Uuid,
        input: UpdateClientInput,
    ) -> AppResult<Client> {
        let existing = self.get_client(client_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let email = input.email.or(existing.email);
        let phone = input.phone.or(existing.phone);
        let address = input.address.or(existing.address);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_contact(&email, &phone)?;

        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET name = $1, email = $2, phone = $3, address = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(name.trim())
        .bind(&email)
        .bind(&phone)
        .bind(&address)
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;

        Ok(client)
    }

    /// Delete a client; refused while sales still reference it
    pub async fn delete_client(&self, client_id: Uuid) -> AppResult<()> {
        let referenced =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sales WHERE client_id = $1)")
                .bind(client_id)
                .fetch_one(&self.db)
                .await?;

        if referenced {
            return Err(AppError::Conflict {
                resource: "client".to_string(),
                message: "Client is referenced by sales".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }

        Ok(())
    }
}
