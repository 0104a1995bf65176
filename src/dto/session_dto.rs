use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::evaluation::EvaluationResult;
use crate::models::question::{Question, QuestionDetails, QuestionType};
use crate::models::session::View;
use crate::services::grading_service::ScoreTier;
use crate::utils::formatting::strip_emphasis;
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySelection {
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// A question as shown while it is being answered: no answer key, no rubric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: String,
    pub year: i32,
    pub question_text: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub related_concepts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_questions: Option<Vec<String>>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        let (options, sub_questions) = match &q.details {
            QuestionDetails::MultipleChoice(mc) => (Some(mc.options.clone()), None),
            QuestionDetails::OpenEnded(open) => (None, open.sub_questions.clone()),
        };
        Self {
            id: q.id.clone(),
            year: q.year,
            question_text: q.question_text.clone(),
            topic: q.topic.clone(),
            question_type: q.question_type(),
            related_concepts: q.related_concepts.iter().map(|c| strip_emphasis(c)).collect(),
            options,
            sub_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub view: View,
    pub categories: Vec<CategorySelection>,
    pub started_at: Option<DateTime<Utc>>,
    pub progress: Option<Progress>,
    pub current_question: Option<QuestionView>,
    pub answered: usize,
    pub correct: usize,
    pub is_finished: bool,
    pub weak_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleCategoryRequest {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleCategoryResponse {
    pub category: String,
    pub selected: bool,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub view: View,
}

/// One of the two fields is expected, matching the current question's type.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub selected_option: Option<usize>,
    #[validate(length(max = 5000))]
    pub answer_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAnswerResponse {
    pub question_id: String,
    pub is_correct: bool,
    /// `false` when the session moved on while the answer was being graded.
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_option_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_tier: Option<ScoreTier>,
    pub review_text: String,
    pub related_concepts: Vec<String>,
    pub is_last: bool,
    pub is_finished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummaryResponse {
    pub total: usize,
    pub correct: usize,
    pub weak_topics: Vec<String>,
    pub study_plan: String,
}
