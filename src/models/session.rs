use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Quiz,
    Concepts,
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub topic: String,
    pub is_correct: bool,
}

/// Identifies the question an in-flight answer belongs to.
///
/// Taken before an AI call and checked after it; any start, restart or recorded
/// answer in between makes it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerTicket {
    pub session_id: Uuid,
    pub answered: usize,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    pub session_id: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub view: View,
    pub selected_categories: BTreeSet<String>,
    pub active_questions: Vec<Question>,
    pub current_index: usize,
    pub results: Vec<AnswerRecord>,
}

impl QuizSession {
    pub fn new(selected_categories: BTreeSet<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: None,
            view: View::Home,
            selected_categories,
            active_questions: Vec::new(),
            current_index: 0,
            results: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        !self.active_questions.is_empty() && self.results.len() == self.active_questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.active_questions.get(self.current_index)
    }

    /// Distinct topics with at least one wrong answer, in first-miss order.
    pub fn weak_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::new();
        for record in self.results.iter().filter(|r| !r.is_correct) {
            if !topics.contains(&record.topic) {
                topics.push(record.topic.clone());
            }
        }
        topics
    }

    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_correct).count()
    }
}
