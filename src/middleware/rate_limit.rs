use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{Error, Result};

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    used: u32,
}

/// Fixed one-second window shared by every request that reaches the AI provider.
#[derive(Clone, Debug)]
pub struct AiRateLimiter {
    per_second: u32,
    window: Arc<Mutex<Window>>,
}

impl AiRateLimiter {
    pub fn new(per_second: u32) -> Self {
        Self {
            per_second: per_second.max(1),
            window: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                used: 0,
            })),
        }
    }

    pub fn try_acquire(&self) -> bool {
        let mut window = self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if window.opened_at.elapsed() >= WINDOW {
            window.opened_at = Instant::now();
            window.used = 0;
        }
        if window.used >= self.per_second {
            return false;
        }
        window.used += 1;
        true
    }

    pub fn acquire(&self) -> Result<()> {
        if self.try_acquire() {
            Ok(())
        } else {
            Err(Error::RateLimited)
        }
    }
}

pub async fn ai_rate_limit(
    State(limiter): State<AiRateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "AI request rejected by rate limiter");
    Error::RateLimited.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_per_window() {
        let limiter = AiRateLimiter::new(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn rejection_is_a_rate_limited_error() {
        let limiter = AiRateLimiter::new(1);
        assert!(limiter.acquire().is_ok());
        assert!(matches!(limiter.acquire(), Err(Error::RateLimited)));

        let response = Error::RateLimited.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[axum::http::header::RETRY_AFTER], "1");
    }

    #[test]
    fn zero_is_clamped_to_one() {
        let limiter = AiRateLimiter::new(0);
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}
