//! Quick questions and quick actions.

use std::time::Instant;

use axum::Json;
use axum::extract::Path;
use serde::Serialize;
use uuid::Uuid;

use healthmate_core::chat::shortcuts::{QUICK_QUESTIONS, QuickAction};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct QuickQuestion {
    pub index: usize,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct QuickActionNotice {
    pub action: String,
    pub notice: &'static str,
}

/// GET /api/v1/quick-questions
pub async fn list_quick_questions() -> Json<ApiResponse<Vec<QuickQuestion>>> {
    let start = Instant::now();
    let questions = QUICK_QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, label)| QuickQuestion { index, label })
        .collect();
    let elapsed = start.elapsed().as_millis() as u64;
    Json(ApiResponse::success(questions, Uuid::now_v7().to_string(), elapsed))
}

/// GET /api/v1/quick-actions/{action}
pub async fn quick_action(
    Path(action): Path<String>,
) -> Result<Json<ApiResponse<QuickActionNotice>>, AppError> {
    let start = Instant::now();
    let action: QuickAction = action.parse().map_err(AppError::Validation)?;
    let body = QuickActionNotice {
        action: action.to_string(),
        notice: action.notice(),
    };
    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(body, Uuid::now_v7().to_string(), elapsed)))
}
