pub mod health;
pub mod session;
pub mod tutor;

use axum::{
    routing::{get, post},
    Router,
};

use crate::middleware::rate_limit::ai_rate_limit;
use crate::AppState;

/// All API routes. Routes that always reach the AI provider sit behind the shared limiter;
/// answering acquires it only for open-ended questions.
pub fn router(state: AppState) -> Router {
    let session_api = Router::new()
        .route("/api/session", get(session::get_session))
        .route(
            "/api/session/categories/toggle",
            post(session::toggle_category),
        )
        .route("/api/session/start", post(session::start_session))
        .route("/api/session/restart", post(session::restart))
        .route("/api/session/view", post(session::navigate))
        .route("/api/session/answer", post(session::submit_answer))
        .route("/api/concepts", get(tutor::list_concepts));

    let ai_api = Router::new()
        .route("/api/session/summary", get(session::get_summary))
        .route("/api/concepts/summary", post(tutor::concept_summary))
        .route(
            "/api/questions/:id/illustration",
            post(tutor::question_illustration),
        )
        .route("/api/ask", post(tutor::ask))
        .layer(axum::middleware::from_fn_with_state(
            state.ai_limiter.clone(),
            ai_rate_limit,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(session_api)
        .merge(ai_api)
        .with_state(state)
}
