//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/` except `/health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use healthmate_core::llm::provider::ModelLoader;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router<L: ModelLoader + 'static>(state: AppState<L>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions", post(handlers::session::create_session::<L>))
        .route("/sessions/{id}", delete(handlers::session::delete_session::<L>))
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::get_messages::<L>).post(handlers::chat::send_message::<L>),
        )
        .route(
            "/sessions/{id}/quick/{index}",
            post(handlers::chat::send_quick_question::<L>),
        )
        .route(
            "/sessions/{id}/clear",
            post(handlers::session::clear_session::<L>),
        )
        .route(
            "/quick-questions",
            get(handlers::shortcuts::list_quick_questions),
        )
        .route(
            "/quick-actions/{action}",
            get(handlers::shortcuts::quick_action),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check::<L>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - liveness plus model load state.
async fn health_check<L: ModelLoader>(
    State(state): State<AppState<L>>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.provider.status(),
        "sessions": state.sessions.len(),
    }))
}
