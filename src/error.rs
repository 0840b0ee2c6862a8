use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum SignbookError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),
}

impl SignbookError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Every error leaves the server as `{"message": "..."}`.
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub message: String,
}

impl IntoResponse for SignbookError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            SignbookError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            SignbookError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            SignbookError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            SignbookError::Database(e) => {
                // Details stay in the server log; clients get a generic line.
                error!(error = %e, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };
        (status, Json(ApiErrorBody { message })).into_response()
    }
}
