use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::dto::session_dto::{CategorySelection, Progress, QuestionView, SessionSnapshot};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::session::{AnswerRecord, AnswerTicket, QuizSession, View};
use crate::services::question_bank::QuestionBank;

/// Owns the learner's session; every mutation goes through one of its operations.
pub struct QuizController {
    bank: Arc<QuestionBank>,
    session: QuizSession,
}

impl QuizController {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        let all = all_categories(&bank);
        Self {
            bank,
            session: QuizSession::new(all),
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Returns whether the category is selected afterwards. An empty selection is allowed here;
    /// it is rejected when the session starts.
    pub fn toggle_category(&mut self, category: &str) -> Result<bool> {
        if !self.bank.categories().iter().any(|c| c == category) {
            return Err(Error::NotFound(format!("Unknown category: {}", category)));
        }
        let selected = &mut self.session.selected_categories;
        if selected.remove(category) {
            Ok(false)
        } else {
            selected.insert(category.to_string());
            Ok(true)
        }
    }

    pub fn start_session(&mut self) -> Result<()> {
        self.start_session_with(&mut rand::thread_rng())
    }

    /// Fails with [`Error::NoTopicsSelected`] and leaves state untouched when the
    /// selection matches no question.
    pub fn start_session_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let mut questions = self
            .bank
            .filter_by_categories(&self.session.selected_categories);
        if questions.is_empty() {
            tracing::warn!("Refusing to start a session without selected topics");
            return Err(Error::NoTopicsSelected);
        }

        questions.shuffle(rng);

        let session = &mut self.session;
        session.session_id = Uuid::new_v4();
        session.started_at = Some(Utc::now());
        session.active_questions = questions;
        session.current_index = 0;
        session.results.clear();
        session.view = View::Quiz;

        tracing::info!(
            session_id = %session.session_id,
            questions = session.active_questions.len(),
            categories = ?session.selected_categories,
            "Quiz session started"
        );
        Ok(())
    }

    /// Records the current question's outcome and advances unless it was the last one.
    ///
    /// Not idempotent: each call appends a result.
    pub fn submit_answer(&mut self, is_correct: bool) -> Result<()> {
        let topic = self.current_question()?.topic.clone();
        let session = &mut self.session;
        session.results.push(AnswerRecord { topic, is_correct });
        if session.current_index + 1 < session.active_questions.len() {
            session.current_index += 1;
        }

        tracing::debug!(
            session_id = %session.session_id,
            answered = session.results.len(),
            total = session.active_questions.len(),
            is_correct,
            "Answer recorded"
        );
        if session.is_finished() {
            tracing::info!(
                session_id = %session.session_id,
                correct = session.correct_count(),
                total = session.active_questions.len(),
                "Quiz session finished"
            );
        }
        Ok(())
    }

    pub fn current_question(&self) -> Result<&Question> {
        if self.session.view != View::Quiz {
            return Err(Error::SessionNotActive);
        }
        self.session.current_question().ok_or(Error::SessionNotActive)
    }

    pub fn answer_ticket(&self) -> Result<(AnswerTicket, Question)> {
        let question = self.current_question()?.clone();
        let ticket = AnswerTicket {
            session_id: self.session.session_id,
            answered: self.session.results.len(),
        };
        Ok((ticket, question))
    }

    pub fn is_ticket_current(&self, ticket: &AnswerTicket) -> bool {
        self.session.view == View::Quiz
            && self.session.session_id == ticket.session_id
            && self.session.results.len() == ticket.answered
    }

    /// Records the answer only if nothing changed since the ticket was taken.
    /// A stale ticket is a no-op and yields `false`.
    pub fn submit_if_current(&mut self, ticket: AnswerTicket, is_correct: bool) -> Result<bool> {
        if !self.is_ticket_current(&ticket) {
            tracing::info!(
                ticket_session = %ticket.session_id,
                current_session = %self.session.session_id,
                "Discarding answer for a question that is no longer on screen"
            );
            return Ok(false);
        }
        self.submit_answer(is_correct)?;
        Ok(true)
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn weak_topics(&self) -> Vec<String> {
        self.session.weak_topics()
    }

    /// Back to the home screen with a fresh selection. The previous question list is kept
    /// until the next start overwrites it.
    pub fn restart(&mut self) {
        let session = &mut self.session;
        session.session_id = Uuid::new_v4();
        session.started_at = None;
        session.results.clear();
        session.current_index = 0;
        session.selected_categories = all_categories(&self.bank);
        session.view = View::Home;
        tracing::info!("Quiz session reset");
    }

    pub fn navigate(&mut self, target: View) -> Result<()> {
        let from = self.session.view;
        let allowed = matches!(
            (from, target),
            (View::Home, View::Concepts)
                | (View::Home, View::Ask)
                | (View::Concepts, View::Home)
                | (View::Ask, View::Home)
                | (View::Home, View::Home)
        );
        if !allowed {
            return Err(Error::InvalidTransition(format!(
                "Cannot move from {:?} to {:?}",
                from, target
            )));
        }
        self.session.view = target;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = &self.session;
        let in_quiz = session.view == View::Quiz && !session.active_questions.is_empty();
        SessionSnapshot {
            session_id: session.session_id,
            view: session.view,
            categories: self
                .bank
                .categories()
                .iter()
                .map(|name| CategorySelection {
                    name: name.clone(),
                    selected: session.selected_categories.contains(name),
                })
                .collect(),
            started_at: session.started_at,
            progress: in_quiz.then(|| Progress {
                current: session.current_index + 1,
                total: session.active_questions.len(),
            }),
            current_question: if in_quiz {
                session.current_question().map(QuestionView::from)
            } else {
                None
            },
            answered: session.results.len(),
            correct: session.correct_count(),
            is_finished: in_quiz && session.is_finished(),
            weak_topics: session.weak_topics(),
        }
    }
}

fn all_categories(bank: &QuestionBank) -> BTreeSet<String> {
    bank.categories().iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn question(id: &str, topic: &str) -> serde_json::Value {
        json!({
            "id": id,
            "year": 2024,
            "questionText": format!("question {}", id),
            "type": "MULTIPLE_CHOICE",
            "topic": topic,
            "relatedConcepts": [],
            "options": ["x", "y"],
            "correctOptionIndex": 0,
            "explanation": ""
        })
    }

    fn bank() -> Arc<QuestionBank> {
        let raw = json!([
            question("a1", "A - one"),
            question("b1", "B - one"),
            question("a2", "A - two"),
            question("b2", "B - two"),
        ]);
        Arc::new(QuestionBank::from_json(&raw.to_string()).unwrap())
    }

    fn ids(controller: &QuizController) -> BTreeSet<String> {
        controller
            .session()
            .active_questions
            .iter()
            .map(|q| q.id.clone())
            .collect()
    }

    #[test]
    fn starts_with_every_category_selected() {
        let controller = QuizController::new(bank());
        assert_eq!(controller.session().selected_categories.len(), 2);
        assert_eq!(controller.session().view, View::Home);
        assert!(!controller.is_finished());
    }

    #[test]
    fn start_uses_exactly_the_selected_categories() {
        let mut rng = StdRng::seed_from_u64(7);
        let selections: [&[&str]; 3] = [&["A"], &["B"], &["A", "B"]];
        for selection in selections {
            let mut controller = QuizController::new(bank());
            for category in ["A", "B"] {
                if !selection.contains(&category) {
                    assert_ok!(controller.toggle_category(category));
                }
            }
            assert_ok!(controller.start_session_with(&mut rng));

            let expected: BTreeSet<String> = bank()
                .questions()
                .iter()
                .filter(|q| selection.contains(&q.category()))
                .map(|q| q.id.clone())
                .collect();
            assert_eq!(ids(&controller), expected);
            assert_eq!(controller.session().view, View::Quiz);
            assert_eq!(controller.session().current_index, 0);
            assert!(controller.session().results.is_empty());
        }
    }

    #[test]
    fn empty_selection_fails_without_touching_state() {
        let mut controller = QuizController::new(bank());
        assert_ok!(controller.toggle_category("B"));
        assert_ok!(controller.start_session());
        controller.restart();
        let before = ids(&controller);

        assert!(!controller.toggle_category("A").unwrap());
        assert!(!controller.toggle_category("B").unwrap());
        let err = assert_err!(controller.start_session());
        assert!(matches!(err, Error::NoTopicsSelected));
        assert_eq!(ids(&controller), before);
        assert_eq!(controller.session().view, View::Home);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut controller = QuizController::new(bank());
        assert!(matches!(
            controller.toggle_category("Z"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn finished_exactly_after_last_answer() {
        let mut controller = QuizController::new(bank());
        assert_ok!(controller.start_session());
        let total = controller.session().active_questions.len();
        for i in 0..total {
            assert!(!controller.is_finished());
            assert_eq!(controller.session().current_index, i);
            assert_ok!(controller.submit_answer(true));
        }
        assert!(controller.is_finished());
        assert_eq!(controller.session().current_index, total - 1);
        assert!(matches!(
            controller.submit_answer(true),
            Err(Error::SessionNotActive)
        ));
        assert_eq!(controller.session().results.len(), total);
    }

    #[test]
    fn double_submit_appends_twice() {
        let mut controller = QuizController::new(bank());
        assert_ok!(controller.start_session());
        assert_ok!(controller.submit_answer(false));
        assert_ok!(controller.submit_answer(false));
        assert_eq!(controller.session().results.len(), 2);
        assert_eq!(controller.session().current_index, 2);
    }

    #[test]
    fn weak_topics_collapse_duplicates() {
        let mut controller = QuizController::new(bank());
        assert_ok!(controller.start_session());
        for _ in 0..4 {
            let topic = controller.current_question().unwrap().topic.clone();
            assert_ok!(controller.submit_answer(topic != "A - one"));
        }
        controller.session.results.push(AnswerRecord {
            topic: "A - one".into(),
            is_correct: true,
        });
        controller.session.results.push(AnswerRecord {
            topic: "B - two".into(),
            is_correct: false,
        });
        controller.session.results.push(AnswerRecord {
            topic: "B - two".into(),
            is_correct: false,
        });

        let weak: BTreeSet<String> = controller.weak_topics().into_iter().collect();
        assert_eq!(weak.len(), controller.weak_topics().len());
        assert_eq!(
            weak,
            ["A - one".to_string(), "B - two".to_string()]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn scenario_deselect_b_answer_both() {
        let mut controller = QuizController::new(bank());
        assert!(!controller.toggle_category("B").unwrap());
        assert_ok!(controller.start_session());
        assert_eq!(
            ids(&controller),
            ["a1".to_string(), "a2".to_string()].into_iter().collect()
        );

        assert_ok!(controller.submit_answer(true));
        let missed = controller.current_question().unwrap().topic.clone();
        assert_ok!(controller.submit_answer(false));

        assert!(controller.is_finished());
        assert_eq!(controller.weak_topics(), vec![missed]);
    }

    #[test]
    fn restart_resets_everything_but_question_list() {
        let mut controller = QuizController::new(bank());
        assert_ok!(controller.toggle_category("A"));
        assert_ok!(controller.start_session());
        assert_ok!(controller.submit_answer(false));
        let previous = ids(&controller);

        controller.restart();
        let session = controller.session();
        assert_eq!(session.view, View::Home);
        assert!(session.results.is_empty());
        assert_eq!(session.current_index, 0);
        assert_eq!(session.selected_categories.len(), 2);
        assert_eq!(ids(&controller), previous);
        assert!(!controller.is_finished());
    }

    #[test]
    fn stale_ticket_is_a_no_op() {
        let mut controller = QuizController::new(bank());
        assert_ok!(controller.start_session());
        let (ticket, _) = controller.answer_ticket().unwrap();
        assert!(controller.submit_if_current(ticket, true).unwrap());
        assert!(!controller.submit_if_current(ticket, true).unwrap());
        assert_eq!(controller.session().results.len(), 1);

        let (ticket, _) = controller.answer_ticket().unwrap();
        controller.restart();
        assert!(!controller.submit_if_current(ticket, false).unwrap());
        assert!(controller.session().results.is_empty());
    }

    #[test]
    fn side_views_only_from_home() {
        let mut controller = QuizController::new(bank());
        assert_ok!(controller.navigate(View::Concepts));
        assert!(matches!(
            controller.navigate(View::Ask),
            Err(Error::InvalidTransition(_))
        ));
        assert_ok!(controller.navigate(View::Home));
        assert_ok!(controller.navigate(View::Ask));
        assert_ok!(controller.navigate(View::Home));
        assert!(controller.navigate(View::Quiz).is_err());

        assert_ok!(controller.start_session());
        assert!(controller.navigate(View::Concepts).is_err());
        assert!(controller.navigate(View::Home).is_err());
    }

    #[test]
    fn snapshot_hides_answer_key_and_reports_progress() {
        let mut controller = QuizController::new(bank());
        let home = controller.snapshot();
        assert!(home.progress.is_none());
        assert!(home.current_question.is_none());
        assert!(home.categories.iter().all(|c| c.selected));

        assert_ok!(controller.start_session());
        assert_ok!(controller.submit_answer(true));
        let snap = controller.snapshot();
        let progress = snap.progress.as_ref().unwrap();
        assert_eq!((progress.current, progress.total), (2, 4));
        let body = serde_json::to_value(&snap).unwrap();
        assert!(body["current_question"].get("correct_option_index").is_none());
        assert_eq!(body["view"], "quiz");
    }
}
