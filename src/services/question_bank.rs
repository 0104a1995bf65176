use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionDetails};
use crate::utils::formatting::strip_emphasis;

const EMBEDDED_BANK: &str = include_str!("../../data/questions.json");

/// Read-only collection of exam questions, loaded once at startup.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    categories: Vec<String>,
}

impl QuestionBank {
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_BANK)
    }

    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading question bank from {}", path.display());
                let raw = tokio::fs::read_to_string(path).await?;
                Self::from_json(&raw)
            }
            None => Self::embedded(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let questions: Vec<Question> = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("Invalid question bank: {}", e)))?;
        Self::new(questions)
    }

    pub fn new(questions: Vec<Question>) -> Result<Self> {
        if questions.is_empty() {
            return Err(Error::Config("Question bank is empty".to_string()));
        }

        let mut ids = HashSet::new();
        for q in &questions {
            if !ids.insert(q.id.as_str()) {
                return Err(Error::Config(format!("Duplicate question id: {}", q.id)));
            }
            if q.topic.trim().is_empty() {
                return Err(Error::Config(format!("Question {} has no topic", q.id)));
            }
            if let QuestionDetails::MultipleChoice(mc) = &q.details {
                if mc.options.len() < 2 {
                    return Err(Error::Config(format!(
                        "Question {} needs at least two options",
                        q.id
                    )));
                }
                if mc.correct_option_index >= mc.options.len() {
                    return Err(Error::Config(format!(
                        "Question {} has correctOptionIndex {} but only {} options",
                        q.id,
                        mc.correct_option_index,
                        mc.options.len()
                    )));
                }
            }
        }

        let mut seen = HashSet::new();
        let categories = questions
            .iter()
            .map(|q| q.category().to_string())
            .filter(|c| seen.insert(c.clone()))
            .collect();

        Ok(Self {
            questions,
            categories,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn filter_by_categories(&self, selected: &BTreeSet<String>) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| selected.contains(q.category()))
            .cloned()
            .collect()
    }

    /// Glossary for the concept explorer: every related concept, unformatted, sorted.
    pub fn concepts(&self) -> Vec<String> {
        self.questions
            .iter()
            .flat_map(|q| q.related_concepts.iter())
            .map(|c| strip_emphasis(c))
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mcq(id: &str, topic: &str, options: usize, correct: usize) -> serde_json::Value {
        json!({
            "id": id,
            "year": 2024,
            "questionText": "?",
            "type": "MULTIPLE_CHOICE",
            "topic": topic,
            "relatedConcepts": ["*x*", "y"],
            "options": (0..options).map(|i| i.to_string()).collect::<Vec<_>>(),
            "correctOptionIndex": correct,
            "explanation": "e"
        })
    }

    #[test]
    fn embedded_bank_loads_and_is_valid() {
        let bank = QuestionBank::embedded().expect("embedded bank");
        assert!(!bank.is_empty());
        assert!(bank.categories().len() >= 2);
        assert!(bank.concepts().iter().all(|c| !c.contains('*')));
    }

    #[test]
    fn rejects_out_of_range_correct_option() {
        let raw = json!([mcq("a", "A - 1", 3, 3)]).to_string();
        let err = QuestionBank::from_json(&raw).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("correctOptionIndex")));
    }

    #[test]
    fn rejects_duplicate_ids_and_empty_bank() {
        let raw = json!([mcq("a", "A - 1", 2, 0), mcq("a", "B - 1", 2, 0)]).to_string();
        assert!(QuestionBank::from_json(&raw).is_err());
        assert!(QuestionBank::from_json("[]").is_err());
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        let raw = json!([
            mcq("1", "B - x", 2, 0),
            mcq("2", "A - y", 2, 0),
            mcq("3", "B - z", 2, 1),
        ])
        .to_string();
        let bank = QuestionBank::from_json(&raw).unwrap();
        assert_eq!(bank.categories(), &["B".to_string(), "A".to_string()]);

        let only_b: BTreeSet<String> = ["B".to_string()].into_iter().collect();
        let ids: Vec<_> = bank
            .filter_by_categories(&only_b)
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn concepts_are_deduplicated_and_sorted() {
        let raw = json!([mcq("1", "A - x", 2, 0), mcq("2", "B - y", 2, 0)]).to_string();
        let bank = QuestionBank::from_json(&raw).unwrap();
        assert_eq!(bank.concepts(), vec!["x".to_string(), "y".to_string()]);
    }
}
