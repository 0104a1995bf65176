use axum::{extract::State, response::Json};
use validator::Validate;

use crate::dto::session_dto::{
    NavigateRequest, SessionSnapshot, SessionSummaryResponse, SubmitAnswerRequest,
    SubmitAnswerResponse, ToggleCategoryRequest, ToggleCategoryResponse,
};
use crate::error::{Error, Result};
use crate::models::question::QuestionDetails;
use crate::services::grading_service::{GradingService, ScoreTier};
use crate::utils::formatting::strip_emphasis;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_session(State(state): State<AppState>) -> Result<Json<SessionSnapshot>> {
    let controller = state.lock_session()?;
    Ok(Json(controller.snapshot()))
}

#[axum::debug_handler]
pub async fn toggle_category(
    State(state): State<AppState>,
    Json(req): Json<ToggleCategoryRequest>,
) -> Result<Json<ToggleCategoryResponse>> {
    req.validate()?;
    let mut controller = state.lock_session()?;
    let selected = controller.toggle_category(&req.category)?;
    Ok(Json(ToggleCategoryResponse {
        category: req.category,
        selected,
        snapshot: controller.snapshot(),
    }))
}

#[axum::debug_handler]
pub async fn start_session(State(state): State<AppState>) -> Result<Json<SessionSnapshot>> {
    let mut controller = state.lock_session()?;
    controller.start_session()?;
    Ok(Json(controller.snapshot()))
}

/// Grades the current question and records the outcome.
///
/// Open-ended answers are graded by the AI gateway without holding the session lock; if the
/// session moved on in the meantime the result is returned but not recorded.
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    req.validate()?;
    let (ticket, question, is_last) = {
        let controller = state.lock_session()?;
        let (ticket, question) = controller.answer_ticket()?;
        let session = controller.session();
        let is_last = session.current_index + 1 == session.active_questions.len();
        (ticket, question, is_last)
    };

    let (is_correct, correct_option_index, evaluation) = match &question.details {
        QuestionDetails::MultipleChoice(mc) => {
            let selected = req.selected_option.ok_or_else(|| {
                Error::BadRequest("selected_option is required for this question".to_string())
            })?;
            let is_correct = GradingService::grade_multiple_choice(mc, selected)?;
            (is_correct, Some(mc.correct_option_index), None)
        }
        QuestionDetails::OpenEnded(open) => {
            state.ai_limiter.acquire()?;
            let answer = req.answer_text.unwrap_or_default();
            let evaluation = state
                .ai_service
                .evaluate_answer(&question.question_text, &open.official_answer, &answer)
                .await;
            (GradingService::grade_open_ended(&evaluation), None, Some(evaluation))
        }
    };

    let (recorded, is_finished) = {
        let mut controller = state.lock_session()?;
        let recorded = controller.submit_if_current(ticket, is_correct)?;
        (recorded, controller.is_finished())
    };

    tracing::info!(
        question_id = %question.id,
        is_correct,
        recorded,
        "Answer graded"
    );

    Ok(Json(SubmitAnswerResponse {
        question_id: question.id.clone(),
        is_correct,
        recorded,
        correct_option_index,
        score_tier: evaluation.as_ref().map(|e| ScoreTier::from_score(e.score)),
        evaluation,
        review_text: question.review_text().to_string(),
        related_concepts: question
            .related_concepts
            .iter()
            .map(|c| strip_emphasis(c))
            .collect(),
        is_last,
        is_finished,
    }))
}

#[axum::debug_handler]
pub async fn restart(State(state): State<AppState>) -> Result<Json<SessionSnapshot>> {
    let mut controller = state.lock_session()?;
    controller.restart();
    Ok(Json(controller.snapshot()))
}

#[axum::debug_handler]
pub async fn navigate(
    State(state): State<AppState>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<SessionSnapshot>> {
    let mut controller = state.lock_session()?;
    controller.navigate(req.view)?;
    Ok(Json(controller.snapshot()))
}

#[axum::debug_handler]
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SessionSummaryResponse>> {
    let (weak_topics, total, correct) = {
        let controller = state.lock_session()?;
        if !controller.is_finished() {
            return Err(Error::SessionNotFinished);
        }
        let session = controller.session();
        (
            controller.weak_topics(),
            session.active_questions.len(),
            session.correct_count(),
        )
    };

    let study_plan = state.ai_service.generate_study_plan(&weak_topics).await;
    Ok(Json(SessionSummaryResponse {
        total,
        correct,
        weak_topics,
        study_plan,
    }))
}
