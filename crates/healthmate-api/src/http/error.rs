//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use healthmate_types::error::ChatError;

use super::response::ApiResponse;

#[derive(Debug)]
pub enum AppError {
    /// No live session with this id.
    SessionNotFound(Uuid),
    /// Model load, generation or quick-question failure.
    Chat(ChatError),
    /// Malformed path or body input.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            AppError::Chat(ChatError::Load(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "MODEL_UNAVAILABLE")
            }
            AppError::Chat(ChatError::Generation(_)) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_FAILED")
            }
            AppError::Chat(ChatError::InvalidQuickQuestion { .. }) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::SessionNotFound(id) => format!("Session {id} not found"),
            AppError::Chat(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(code, error = %self.message(), "Request failed");
        }

        let body = ApiResponse::failure(code, self.message(), Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}
