use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::nl_edit::EditError;
use crate::preview::surface::SyncError;
use crate::templates::CompileError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CompileError> for AppError {
    fn from(e: CompileError) -> Self {
        match e {
            CompileError::UnknownTemplate(id) => AppError::UnknownTemplate(id),
        }
    }
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::EmptyInstruction => AppError::Validation(e.to_string()),
            EditError::DocumentNotFound(_) => AppError::NotFound(e.to_string()),
            EditError::MalformedCollaboratorResponse(_) | EditError::DroppedRequiredField(_) => {
                AppError::UnprocessableEntity(e.to_string())
            }
            EditError::Superseded => AppError::Conflict(e.to_string()),
            EditError::Collaborator(inner) => AppError::Collaborator(inner.to_string()),
            EditError::Serialize(inner) => AppError::Internal(inner.into()),
        }
    }
}

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        AppError::Internal(anyhow::anyhow!("preview sync failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnknownTemplate(id) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_TEMPLATE",
                format!("Unknown template: {id}"),
            ),
            AppError::UnprocessableEntity(msg) => {
                tracing::warn!("Rejected collaborator response: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MALFORMED_COLLABORATOR_RESPONSE",
                    msg.clone(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "SUPERSEDED", msg.clone()),
            AppError::Collaborator(msg) => {
                tracing::error!("Collaborator error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "COLLABORATOR_ERROR",
                    "The generation service failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
