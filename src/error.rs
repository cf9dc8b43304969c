use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures of the read side the schedule validator depends on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The schedule validator rejected a block.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(e) => database_failure(&e),
            AppError::Store(StoreError::MissingReference { entity, id }) => (
                StatusCode::BAD_REQUEST,
                format!("{} {} does not exist", entity, id),
            ),
            AppError::Store(StoreError::Unavailable(e)) => database_failure(&e),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}

fn database_failure(e: &sqlx::Error) -> (StatusCode, String) {
    if let sqlx::Error::Database(db) = e {
        if db.is_foreign_key_violation() {
            return (
                StatusCode::BAD_REQUEST,
                "Referenced entity does not exist or is still in use".to_string(),
            );
        }
        if db.is_unique_violation() {
            return (StatusCode::BAD_REQUEST, "Duplicate value".to_string());
        }
    }
    error!("database error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error occurred".to_string(),
    )
}
