//! services/api/src/web/ai.rs
//!
//! The `/api/ai/*` endpoints. Each one validates its request, asks the
//! `StudyAiService` for content and, except for chat, persists what comes back.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studyspark_core::domain::{
    ChatTurn, Flashcard, NewSummary, Question, QuestionType, StudyPlan, Summary,
};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::{
    state::AppState,
    validation::{max_len, require_text, Validate, ValidJson},
};

const DEFAULT_GENERATION_COUNT: usize = 5;
const MAX_CHAT_MESSAGE: usize = 4000;

//=========================================================================================
// Request and Response Payloads
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub note_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    /// Earlier turns, oldest first.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

/// When `content` is omitted the referenced summary supplies the material.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFlashcardsRequest {
    pub subject_id: Uuid,
    #[serde(default)]
    pub summary_id: Option<Uuid>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default = "default_count")]
    pub count: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    pub subject_id: Uuid,
    #[serde(default)]
    pub summary_id: Option<Uuid>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default = "default_question_types")]
    pub types: Vec<QuestionType>,
    #[serde(default = "default_count")]
    pub count: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateStudyPlanRequest {
    pub prompt: String,
    /// Subject names to plan around; the stored subjects are used when omitted.
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
}

fn default_count() -> usize {
    DEFAULT_GENERATION_COUNT
}

fn default_question_types() -> Vec<QuestionType> {
    vec![QuestionType::Mcq, QuestionType::Short]
}

impl Validate for SummarizeRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Validate for ChatRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("message", &self.message)?;
        max_len("message", &self.message, MAX_CHAT_MESSAGE)
    }
}

/// Shared by both generators: some material and a positive count.
fn validate_source(
    summary_id: Option<Uuid>,
    content: Option<&String>,
    count: usize,
) -> Result<(), String> {
    let has_content = content.is_some_and(|c| !c.trim().is_empty());
    if !has_content && summary_id.is_none() {
        return Err("content or summaryId is required".to_string());
    }
    if count == 0 {
        return Err("count must be at least 1".to_string());
    }
    Ok(())
}

impl Validate for GenerateFlashcardsRequest {
    fn validate(&self) -> Result<(), String> {
        validate_source(self.summary_id, self.content.as_ref(), self.count)
    }
}

impl Validate for GenerateQuestionsRequest {
    fn validate(&self) -> Result<(), String> {
        validate_source(self.summary_id, self.content.as_ref(), self.count)?;
        if self.types.is_empty() {
            return Err("types must not be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for GenerateStudyPlanRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("prompt", &self.prompt)
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Summarize a stored note and save the summary.
#[utoipa::path(
    post,
    path = "/api/ai/summarize",
    tag = "ai",
    request_body = SummarizeRequest,
    responses(
        (status = 201, description = "Summary created", body = Summary),
        (status = 404, description = "Note not found", body = ErrorBody),
        (status = 500, description = "The AI provider failed", body = ErrorBody)
    )
)]
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<SummarizeRequest>,
) -> HttpResult<impl IntoResponse> {
    let note = state
        .storage
        .get_note(request.note_id)
        .await?
        .ok_or(HttpError::NotFound("Note"))?;

    let content = state
        .ai
        .summarize(&note.content, &note.title)
        .await?;

    let summary = state
        .storage
        .create_summary(NewSummary {
            note_id: note.id,
            subject_id: note.subject_id,
            title: note.title,
            content,
        })
        .await?;
    info!("Created summary {} for note {}", summary.id, summary.note_id);
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Talk to the tutor. Nothing is stored.
#[utoipa::path(
    post,
    path = "/api/ai/chat",
    tag = "ai",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The tutor's reply", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorBody),
        (status = 500, description = "The AI provider failed", body = ErrorBody)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<ChatRequest>,
) -> HttpResult<Json<ChatResponse>> {
    let response = state
        .ai
        .chat(&request.message, &request.history)
        .await?;
    Ok(Json(ChatResponse { response }))
}

/// Generate flashcards for a subject and save them.
#[utoipa::path(
    post,
    path = "/api/ai/flashcards",
    tag = "ai",
    request_body = GenerateFlashcardsRequest,
    responses(
        (status = 201, description = "Flashcards created", body = Vec<Flashcard>),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Subject or summary not found", body = ErrorBody),
        (status = 500, description = "The AI provider failed", body = ErrorBody)
    )
)]
pub async fn generate_flashcards(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<GenerateFlashcardsRequest>,
) -> HttpResult<impl IntoResponse> {
    let material = study_material(
        &state,
        request.subject_id,
        request.summary_id,
        request.content,
    )
    .await?;

    let drafts = state
        .ai
        .generate_flashcards(&material, request.count)
        .await?;

    let inputs = drafts
        .into_iter()
        .map(|d| d.into_new(request.subject_id, request.summary_id))
        .collect();
    let cards = state.storage.create_flashcards(inputs).await?;
    info!(
        "Created {} flashcards for subject {}",
        cards.len(),
        request.subject_id
    );
    Ok((StatusCode::CREATED, Json(cards)))
}

/// Generate practice questions for a subject and save them.
#[utoipa::path(
    post,
    path = "/api/ai/questions",
    tag = "ai",
    request_body = GenerateQuestionsRequest,
    responses(
        (status = 201, description = "Questions created", body = Vec<Question>),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Subject or summary not found", body = ErrorBody),
        (status = 500, description = "The AI provider failed", body = ErrorBody)
    )
)]
pub async fn generate_questions(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<GenerateQuestionsRequest>,
) -> HttpResult<impl IntoResponse> {
    let material = study_material(
        &state,
        request.subject_id,
        request.summary_id,
        request.content,
    )
    .await?;

    let drafts = state
        .ai
        .generate_questions(&material, &request.types, request.count)
        .await?;

    let inputs = drafts
        .into_iter()
        .map(|d| d.into_new(request.subject_id, request.summary_id))
        .collect();
    let questions = state.storage.create_questions(inputs).await?;
    info!(
        "Created {} questions for subject {}",
        questions.len(),
        request.subject_id
    );
    Ok((StatusCode::CREATED, Json(questions)))
}

/// Generate a dated study plan and save it.
#[utoipa::path(
    post,
    path = "/api/ai/study-plan",
    tag = "ai",
    request_body = GenerateStudyPlanRequest,
    responses(
        (status = 201, description = "Study plan created", body = StudyPlan),
        (status = 400, description = "Empty prompt", body = ErrorBody),
        (status = 500, description = "The AI provider failed", body = ErrorBody)
    )
)]
pub async fn generate_study_plan(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<GenerateStudyPlanRequest>,
) -> HttpResult<impl IntoResponse> {
    let subjects = match request.subjects {
        Some(names) => names,
        None => state
            .storage
            .get_subjects()
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect(),
    };

    let plan = state
        .ai
        .generate_study_plan(&request.prompt, &subjects)
        .await?;

    let plan = state.storage.create_study_plan(plan).await?;
    info!("Created study plan {} with {} tasks", plan.id, plan.tasks.len());
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Resolves the text to generate from: explicit content wins, otherwise the
/// referenced summary. The subject must exist, and a referenced summary must exist
/// and belong to that subject, even when content is supplied.
async fn study_material(
    state: &AppState,
    subject_id: Uuid,
    summary_id: Option<Uuid>,
    content: Option<String>,
) -> HttpResult<String> {
    if state.storage.get_subject(subject_id).await?.is_none() {
        return Err(HttpError::NotFound("Subject"));
    }
    let summary = match summary_id {
        Some(id) => {
            let summary = state
                .storage
                .get_summary(id)
                .await?
                .ok_or(HttpError::NotFound("Summary"))?;
            if summary.subject_id != subject_id {
                return Err(HttpError::bad_request(
                    "summaryId belongs to a different subject",
                ));
            }
            Some(summary)
        }
        None => None,
    };

    match (content.filter(|c| !c.trim().is_empty()), summary) {
        (Some(content), _) => Ok(content),
        (None, Some(summary)) => Ok(summary_text(&summary)),
        (None, None) => Err(HttpError::bad_request("content or summaryId is required")),
    }
}

fn summary_text(summary: &Summary) -> String {
    let mut text = summary.full_summary.clone();
    for point in &summary.key_points {
        text.push_str("\n- ");
        text.push_str(point);
    }
    for definition in &summary.definitions {
        text.push_str(&format!("\n{}: {}", definition.term, definition.definition));
    }
    text
}
