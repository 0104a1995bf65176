use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "questions": state.bank.len(),
        "categories": state.bank.categories().len(),
    });
    (StatusCode::OK, Json(body))
}
