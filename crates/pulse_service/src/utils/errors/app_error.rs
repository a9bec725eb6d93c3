use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::error_payload::ErrorPayload;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("An error occurred while accessing the database")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    pub fn code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_type(&self) -> String {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
        }
        .to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code();
        match &self {
            AppError::DatabaseError(e) => error!("Database error: {}", e),
            AppError::InternalServerError(detail) => error!("Internal error: {}", detail),
            _ => {}
        }

        let error_response = ErrorPayload {
            message: self.to_string(),
            code: status.as_u16(),
            r#type: self.error_type(),
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_hide_their_cause() {
        let err = AppError::InternalServerError("lock poisoned".to_string());
        assert_eq!(err.code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::NotFound("token btc-new-0".to_string());
        assert_eq!(err.code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_type(), "NOT_FOUND");
    }
}
