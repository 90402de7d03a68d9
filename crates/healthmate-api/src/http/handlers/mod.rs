//! REST API handler modules.

pub mod chat;
pub mod session;
pub mod shortcuts;

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use healthmate_core::chat::session::ChatSession;
use healthmate_core::llm::provider::ModelLoader;

use crate::http::error::AppError;
use crate::state::AppState;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid session id: {s}")))
}

/// Resolve a session path parameter to its live session.
fn find_session<L: ModelLoader>(
    state: &AppState<L>,
    id: &str,
) -> Result<(Uuid, Arc<Mutex<ChatSession>>), AppError> {
    let id = parse_uuid(id)?;
    let session = state.session(&id).ok_or(AppError::SessionNotFound(id))?;
    Ok((id, session))
}
