//! Client endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use stockroom_core::{Client, ClientPatch, NewClient};
use tracing::info;

use crate::dto::ClientQuery;
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, Pagination};
use crate::state::AppState;

/// `POST /clients`
pub async fn create_client(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewClient>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    body.validate()?;
    let client = state.db.clients().create(&body).await?;
    info!(id = client.id, "Client registered");
    Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /clients?name&phone&page&limit`
pub async fn list_clients(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ClientQuery>,
    Pagination(page): Pagination,
) -> Result<Json<Vec<Client>>, ApiError> {
    let clients = state.db.clients().find(&query.into(), page).await?;
    Ok(Json(clients))
}

/// `GET /clients/{id}`
pub async fn get_client(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Client>, ApiError> {
    state
        .db
        .clients()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Client", id))
}

/// `PATCH /clients/{id}`
pub async fn update_client(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<ClientPatch>,
) -> Result<Json<Client>, ApiError> {
    patch.validate()?;
    let client = state.db.clients().update(id, &patch).await?;
    Ok(Json(client))
}

/// `DELETE /clients/{id}`
pub async fn delete_client(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.clients().delete(id).await?;
    info!(id, "Client deleted");
    Ok(StatusCode::NO_CONTENT)
}
