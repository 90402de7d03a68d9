//! Chat submission handlers.
//!
//! Endpoints:
//! - POST /api/v1/sessions/{id}/messages      - Submit `{ "message": "..." }`
//! - POST /api/v1/sessions/{id}/quick/{index} - Submit quick question `index`
//!
//! The session lock is held for the whole submit, so requests to one
//! session are answered one at a time.

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use healthmate_core::llm::provider::ModelLoader;
use healthmate_types::chat::ChatView;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

use super::find_session;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// POST /api/v1/sessions/{id}/messages
pub async fn send_message<L: ModelLoader>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, session) = find_session(&state, &id)?;
    let Json(request) = payload?;
    let view = session
        .lock()
        .await
        .on_submit(&state.provider, &request.message)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(view, request_id, elapsed)))
}

/// POST /api/v1/sessions/{id}/quick/{index}
pub async fn send_quick_question<L: ModelLoader>(
    State(state): State<AppState<L>>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ChatView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, session) = find_session(&state, &id)?;
    let index: usize = index
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid quick question index: {index}")))?;
    let view = session
        .lock()
        .await
        .on_quick_question(&state.provider, index)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(view, request_id, elapsed)))
}
