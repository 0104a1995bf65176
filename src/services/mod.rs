pub mod ai_backend;
pub mod ai_service;
pub mod grading_service;
pub mod question_bank;
pub mod session_service;
