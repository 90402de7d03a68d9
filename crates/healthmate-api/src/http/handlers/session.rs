//! Session lifecycle HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions               - Create a session (greeting seeded)
//! - GET    /api/v1/sessions/{id}/messages - All turns of a session
//! - POST   /api/v1/sessions/{id}/clear    - Drop every turn, keep the session
//! - DELETE /api/v1/sessions/{id}          - Drop the session

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use healthmate_core::chat::session::ChatSession;
use healthmate_core::llm::provider::ModelLoader;
use healthmate_types::chat::Turn;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

use super::find_session;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
}

impl From<&ChatSession> for SessionResponse {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id(),
            started_at: session.started_at(),
            turns: session.turns().to_vec(),
        }
    }
}

/// POST /api/v1/sessions
pub async fn create_session<L: ModelLoader>(
    State(state): State<AppState<L>>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, session) = state.create_session();
    let body = SessionResponse::from(&*session.lock().await);
    tracing::info!(session_id = %id, live_sessions = state.sessions.len(), "Session created");

    let elapsed = start.elapsed().as_millis() as u64;
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(body, request_id, elapsed)),
    )
}

/// GET /api/v1/sessions/{id}/messages
pub async fn get_messages<L: ModelLoader>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Turn>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, session) = find_session(&state, &id)?;
    let turns = session.lock().await.turns().to_vec();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(turns, request_id, elapsed)))
}

/// POST /api/v1/sessions/{id}/clear
pub async fn clear_session<L: ModelLoader>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, session) = find_session(&state, &id)?;
    let mut session = session.lock().await;
    session.clear();
    let body = SessionResponse::from(&*session);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(body, request_id, elapsed)))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session<L: ModelLoader>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, _) = find_session(&state, &id)?;
    state.remove_session(&id);
    tracing::info!(session_id = %id, "Session deleted");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "id": id, "deleted": true }),
        request_id,
        elapsed,
    )))
}
