use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::evaluation::EvaluationResult;
use crate::models::question::MultipleChoiceDetails;

/// Minimum AI score for an open-ended answer to count as known for topic tracking.
pub const PASSING_SCORE: u32 = 65;

/// Feedback colouring thresholds. Independent of [`PASSING_SCORE`].
pub const HIGH_TIER_ABOVE: u32 = 80;
pub const MEDIUM_TIER_ABOVE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

impl ScoreTier {
    pub fn from_score(score: u32) -> Self {
        if score > HIGH_TIER_ABOVE {
            ScoreTier::High
        } else if score > MEDIUM_TIER_ABOVE {
            ScoreTier::Medium
        } else {
            ScoreTier::Low
        }
    }
}

pub struct GradingService;

impl GradingService {
    /// Exact match against the answer key; no partial credit.
    pub fn grade_multiple_choice(details: &MultipleChoiceDetails, selected: usize) -> Result<bool> {
        if selected >= details.options.len() {
            return Err(Error::BadRequest(format!(
                "Option {} does not exist (question has {} options)",
                selected,
                details.options.len()
            )));
        }
        Ok(selected == details.correct_option_index)
    }

    pub fn grade_open_ended(evaluation: &EvaluationResult) -> bool {
        evaluation.score >= PASSING_SCORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> MultipleChoiceDetails {
        MultipleChoiceDetails {
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option_index: 2,
            explanation: String::new(),
        }
    }

    #[test]
    fn multiple_choice_is_exact_match() {
        assert!(GradingService::grade_multiple_choice(&details(), 2).unwrap());
        assert!(!GradingService::grade_multiple_choice(&details(), 0).unwrap());
        assert!(matches!(
            GradingService::grade_multiple_choice(&details(), 3),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn open_ended_boundary_is_65() {
        assert!(!GradingService::grade_open_ended(&EvaluationResult::new(64, "")));
        assert!(GradingService::grade_open_ended(&EvaluationResult::new(65, "")));
        assert!(GradingService::grade_open_ended(&EvaluationResult::new(100, "")));
        assert!(!GradingService::grade_open_ended(&EvaluationResult::new(0, "")));
    }

    #[test]
    fn display_tiers() {
        assert_eq!(ScoreTier::from_score(81), ScoreTier::High);
        assert_eq!(ScoreTier::from_score(80), ScoreTier::Medium);
        assert_eq!(ScoreTier::from_score(51), ScoreTier::Medium);
        assert_eq!(ScoreTier::from_score(50), ScoreTier::Low);
    }
}
