use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::service::Service;
use crate::store::traits::Store;

pub type AppState<S> = Arc<Service<S>>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Translate a service failure into a status and a client-safe body.
/// Internal causes are logged and replaced by a generic message.
pub fn error_response(err: AppError) -> ApiError {
    match err {
        AppError::NotFound(message) => {
            log::warn!("Not found: {}", message);
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new(&message)))
        }
        AppError::InvalidInput(message) => {
            log::warn!("Invalid input: {}", message);
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(&message)))
        }
        AppError::Internal(cause) => {
            log::error!("Internal error: {:#}", cause);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("internal server error")),
            )
        }
    }
}

/// Unwrap a JSON body, answering 400 for anything that is not valid JSON
/// of the expected shape.
pub fn request_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            log::warn!("Rejected request body: {}", rejection.body_text());
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("invalid request body")),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub message: String,
    pub database: String,
}

/// Liveness plus a database probe; always answers 200.
pub async fn health_check<S: Store>(State(service): State<AppState<S>>) -> Json<HealthResponse> {
    let database = if service.database_reachable().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Animal Ekarte API is running".to_string(),
        database: database.to_string(),
    })
}

pub async fn welcome() -> Json<MessageResponse> {
    MessageResponse::new("Welcome to Animal Ekarte API")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_are_masked() {
        let (status, Json(body)) =
            error_response(AppError::Internal(anyhow::anyhow!("password=hunter2 refused")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "internal server error");
    }

    #[test]
    fn test_caller_errors_keep_their_message() {
        let (status, Json(body)) = error_response(AppError::not_found("pet", "x"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "pet with id x not found");

        let (status, Json(body)) = error_response(AppError::invalid("invalid pet ID format"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "invalid pet ID format");
    }
}
