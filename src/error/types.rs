use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::services::storage::StorageError;

/// Classification of a fault, consumed by the telemetry middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Validation,
    NotFound,
    Internal,
}

/// Fault record attached to a response's extensions so the telemetry
/// middleware can classify the outcome without inspecting the body.
/// The message is for logs only and never reaches the caller.
#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a validation error from a garde report, one violation per
    /// failed field.
    pub fn from_validation(report: garde::Report) -> Self {
        AppError::Validation(
            report
                .iter()
                .map(|(path, error)| format!("{path}: {error}"))
                .collect(),
        )
    }

    fn fault(&self) -> Fault {
        let kind = match self {
            AppError::Validation(_) => FaultKind::Validation,
            AppError::NotFound(_) => FaultKind::NotFound,
            AppError::Config(_) | AppError::Internal(_) => FaultKind::Internal,
        };
        let message = match self {
            AppError::Validation(violations) => violations.join("; "),
            AppError::Config(msg) => msg.clone(),
            AppError::Internal(err) => err.to_string(),
            other => other.to_string(),
        };
        Fault { kind, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let fault = self.fault();

        let mut response = match &self {
            AppError::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "success": false, "detail": violations })),
            )
                .into_response(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            // Internal detail goes to the log trail, never the caller.
            AppError::Config(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false })),
            )
                .into_response(),
        };

        response.extensions_mut().insert(fault);
        response
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(entity) => AppError::NotFound(entity),
            StorageError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}
