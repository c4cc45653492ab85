use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{BookingStatus, DraftError};
use crate::services::flow::{FlowStep, MissingPrerequisite};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("time slot {0} is not available")]
    InvalidSlot(String),

    #[error("{0}")]
    MissingPrerequisite(#[from] MissingPrerequisite),

    #[error("{0}")]
    Draft(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden, continue at {home}")]
    Forbidden { home: String },

    #[error("a request for this action is already in progress")]
    Busy,

    #[error("booking draft changed while the request was in flight")]
    Stale,

    #[error("cannot move booking from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl AppError {
    pub fn validation<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AppError::Validation(fields.into_iter().map(Into::into).collect())
    }

    pub fn transition(from: BookingStatus, to: BookingStatus) -> Self {
        AppError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::InvalidSlot { slot_id } => AppError::InvalidSlot(slot_id),
            other => AppError::Draft(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidSlot(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingPrerequisite(_) => StatusCode::CONFLICT,
            AppError::Draft(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Busy => StatusCode::CONFLICT,
            AppError::Stale => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let mut body = serde_json::json!({ "error": self.to_string() });
        match &self {
            AppError::Validation(fields) => body["fields"] = serde_json::json!(fields),
            AppError::Forbidden { home } => body["redirect"] = serde_json::json!(home),
            AppError::MissingPrerequisite(err) => {
                body["missing"] = serde_json::json!(err.missing);
                body["redirect"] = serde_json::json!(FlowStep::ServiceSelection.path());
            }
            _ => {}
        }

        (status, axum::Json(body)).into_response()
    }
}
