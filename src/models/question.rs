use serde::{Deserialize, Serialize};

/// Separator between a topic's category and its subtopic, e.g. `"גוף האדם - מערכת העיכול"`.
pub const CATEGORY_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub year: i32,
    pub question_text: String,
    pub topic: String,
    #[serde(default)]
    pub related_concepts: Vec<String>,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

impl Question {
    /// Everything before the first `" - "`; the whole topic when there is no separator.
    pub fn category(&self) -> &str {
        category_of(&self.topic)
    }

    pub fn question_type(&self) -> QuestionType {
        match self.details {
            QuestionDetails::MultipleChoice(_) => QuestionType::MultipleChoice,
            QuestionDetails::OpenEnded(_) => QuestionType::OpenEnded,
        }
    }

    /// Text shown after an answer is committed: the MCQ explanation or the official rubric.
    pub fn review_text(&self) -> &str {
        match &self.details {
            QuestionDetails::MultipleChoice(mc) => &mc.explanation,
            QuestionDetails::OpenEnded(open) => &open.official_answer,
        }
    }
}

pub fn category_of(topic: &str) -> &str {
    topic
        .split_once(CATEGORY_SEPARATOR)
        .map(|(category, _)| category)
        .unwrap_or(topic)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultipleChoice,
    OpenEnded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionDetails {
    MultipleChoice(MultipleChoiceDetails),
    OpenEnded(OpenEndedDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceDetails {
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenEndedDetails {
    pub official_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_questions: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_prefix_before_first_separator() {
        assert_eq!(category_of("גוף האדם - מערכת העיכול"), "גוף האדם");
        assert_eq!(category_of("A - B - C"), "A");
        assert_eq!(category_of("אקולוגיה"), "אקולוגיה");
        assert_eq!(category_of("A-B"), "A-B");
    }

    #[test]
    fn deserializes_both_variants_from_bank_shape() {
        let raw = serde_json::json!([
            {
                "id": "q1",
                "year": 2023,
                "questionText": "?",
                "type": "MULTIPLE_CHOICE",
                "topic": "התא - אברונים",
                "relatedConcepts": ["*מיטוכונדריה*"],
                "options": ["a", "b"],
                "correctOptionIndex": 1,
                "explanation": "because"
            },
            {
                "id": "q2",
                "year": 2021,
                "questionText": "explain",
                "type": "OPEN_ENDED",
                "topic": "אקולוגיה - מארג מזון",
                "relatedConcepts": [],
                "officialAnswer": "rubric",
                "subQuestions": ["a", "b"]
            }
        ]);

        let questions: Vec<Question> = serde_json::from_value(raw).unwrap();
        assert_eq!(questions[0].question_type(), QuestionType::MultipleChoice);
        assert_eq!(questions[0].category(), "התא");
        assert_eq!(questions[0].review_text(), "because");
        match &questions[1].details {
            QuestionDetails::OpenEnded(open) => {
                assert_eq!(open.official_answer, "rubric");
                assert_eq!(open.sub_questions.as_ref().map(Vec::len), Some(2));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let raw = serde_json::json!({
            "id": "q",
            "year": 2020,
            "questionText": "?",
            "type": "ESSAY",
            "topic": "t",
            "relatedConcepts": []
        });
        assert!(serde_json::from_value::<Question>(raw).is_err());
    }
}
