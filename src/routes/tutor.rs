use axum::{
    extract::{Path, State},
    response::Json,
};
use validator::Validate;

use crate::dto::tutor_dto::{
    AskRequest, AskResponse, ConceptListResponse, ConceptSummaryRequest, ConceptSummaryResponse,
    IllustrationResponse,
};
use crate::error::{Error, Result};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_concepts(State(state): State<AppState>) -> Json<ConceptListResponse> {
    Json(ConceptListResponse {
        concepts: state.bank.concepts(),
    })
}

#[axum::debug_handler]
pub async fn concept_summary(
    State(state): State<AppState>,
    Json(req): Json<ConceptSummaryRequest>,
) -> Result<Json<ConceptSummaryResponse>> {
    req.validate()?;
    let topic = req.topic.trim();
    let summary = state.ai_service.get_topic_summary(topic).await;
    Ok(Json(ConceptSummaryResponse {
        topic: topic.to_string(),
        summary,
    }))
}

#[axum::debug_handler]
pub async fn question_illustration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IllustrationResponse>> {
    let question = state
        .bank
        .get(&id)
        .ok_or_else(|| Error::NotFound(format!("Question {} not found", id)))?;

    let image = state
        .ai_service
        .generate_concept_image(&question.topic, &question.related_concepts)
        .await;
    if image.is_none() {
        tracing::info!(question_id = %id, "No illustration, client falls back to topic visual");
    }

    Ok(Json(IllustrationResponse {
        question_id: question.id.clone(),
        topic: question.topic.clone(),
        image,
    }))
}

#[axum::debug_handler]
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    req.validate()?;
    let question = req.question.trim();
    let answer = state.ai_service.ask_freeform_question(question).await;
    Ok(Json(AskResponse { answer }))
}
