use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Learner-facing notification shown when a session is started with no category selected.
pub const NO_TOPICS_SELECTED_MESSAGE: &str = "יש לבחור לפחות נושא אחד לתרגול";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No topics selected")]
    NoTopicsSelected,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("No quiz in progress")]
    SessionNotActive,

    #[error("Quiz is not finished yet")]
    SessionNotFinished,

    #[error("Too many AI requests")]
    RateLimited,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let retry_after = matches!(self, Error::RateLimited);
        let (status, code, message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Error::NoTopicsSelected => (
                StatusCode::BAD_REQUEST,
                "no_topics_selected",
                NO_TOPICS_SELECTED_MESSAGE.to_string(),
            ),
            Error::InvalidTransition(msg) => (StatusCode::CONFLICT, "invalid_transition", msg),
            Error::SessionNotActive => (
                StatusCode::CONFLICT,
                "session_not_active",
                "There is no question waiting for an answer".to_string(),
            ),
            Error::SessionNotFinished => (
                StatusCode::CONFLICT,
                "session_not_finished",
                "The summary is available once every question is answered".to_string(),
            ),
            Error::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limit_exceeded",
                "Too many AI requests, try again in a moment".to_string(),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "invalid_json", err.to_string()),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                format!("External service error: {}", err),
            ),
            Error::Config(msg) => {
                tracing::error!("Configuration error surfaced at request time: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string()),
            Error::Anyhow(err) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", err.to_string()),
        };

        let body = Json(json!({ "error": code, "message": message }));
        let mut response = (status, body).into_response();
        if retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
