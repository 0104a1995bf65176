use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptListResponse {
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConceptSummaryRequest {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptSummaryResponse {
    pub topic: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IllustrationResponse {
    pub question_id: String,
    pub topic: String,
    /// `data:` URL, or `null` when the caller should fall back to its own visual.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 2000), custom(function = "not_blank"))]
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_requests_fail_validation() {
        let ask = AskRequest {
            question: "   ".to_string(),
        };
        let errors = ask.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("question"));

        let summary = ConceptSummaryRequest {
            topic: "\t".to_string(),
        };
        assert!(summary.validate().is_err());

        let ask = AskRequest {
            question: "מהו ATP?".to_string(),
        };
        assert!(ask.validate().is_ok());
    }
}
