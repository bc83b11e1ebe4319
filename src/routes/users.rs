//! User handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use garde::Validate;

use crate::error::AppError;
use crate::schema::{User, UserPayload};
use crate::server::AppState;

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<User>), AppError> {
    payload.validate().map_err(AppError::from_validation)?;

    let user = state.users.create(User::new(payload.username)).await?;
    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}
