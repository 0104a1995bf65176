pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::middleware::rate_limit::AiRateLimiter;
use crate::services::{
    ai_service::AIService, question_bank::QuestionBank, session_service::QuizController,
};
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<QuestionBank>,
    pub session: Arc<Mutex<QuizController>>,
    pub ai_service: AIService,
    pub ai_limiter: AiRateLimiter,
}

impl AppState {
    pub fn new(config: &Config, bank: QuestionBank) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.ai_timeout() + Duration::from_secs(5))
            .build()?;
        let ai_service = AIService::gemini(config, http_client);
        Ok(Self::with_ai_service(bank, ai_service, config.ai_rps))
    }

    pub fn with_ai_service(bank: QuestionBank, ai_service: AIService, ai_rps: u32) -> Self {
        let bank = Arc::new(bank);
        let session = Arc::new(Mutex::new(QuizController::new(bank.clone())));
        Self {
            bank,
            session,
            ai_service,
            ai_limiter: AiRateLimiter::new(ai_rps),
        }
    }

    /// Never hold the guard across an `.await`.
    pub fn lock_session(&self) -> Result<MutexGuard<'_, QuizController>> {
        self.session
            .lock()
            .map_err(|_| Error::Internal("Session state is unavailable".to_string()))
    }
}
