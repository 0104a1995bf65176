use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outcome of grading one open-ended answer.
///
/// This is also the exact shape the model must return; extra fields or an out-of-range
/// score make the reply unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EvaluationResult {
    #[validate(range(max = 100))]
    pub score: u32,
    pub feedback: String,
}

impl EvaluationResult {
    pub fn new(score: u32, feedback: impl Into<String>) -> Self {
        Self {
            score,
            feedback: feedback.into(),
        }
    }
}
