//! Item CRUD handlers.
//!
//! Handlers only produce data or an `AppError`; logging of the terminal
//! outcome and the counter increment belong to the telemetry
//! middleware, which sees every exit path exactly once.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use garde::Validate;

use crate::error::AppError;
use crate::schema::{Item, ItemPayload};
use crate::server::AppState;

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, AppError> {
    let items = state.items.list().await?;
    Ok(Json(items))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<ItemPayload>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    payload.validate().map_err(AppError::from_validation)?;

    let item = state.items.create(Item::new(payload.name)).await?;
    tracing::info!(item_id = %item.id, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Item>, AppError> {
    let item = state.items.get(id).await?;
    Ok(Json(item))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<ItemPayload>,
) -> Result<Json<Item>, AppError> {
    payload.validate().map_err(AppError::from_validation)?;

    let item = state.items.update(id, Item::new(payload.name)).await?;
    tracing::info!(item_id = %item.id, "Item updated");
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.items.delete(id).await?;
    tracing::info!(item_id = %id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}
