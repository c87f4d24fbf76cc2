//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI document, plus the small service
//! endpoints that do not belong to a resource.

use axum::Json;
use serde::Serialize;
use studyspark_core::domain::{
    ChatRole, ChatTurn, DashboardStats, Definition, Difficulty, Flashcard, FlashcardPatch,
    NewNote, NewSubject, Note, Priority, Question, QuestionType, StudyPlan, StudyTask,
    StudyTaskPatch, Subject, SubjectPatch, Summary, UpcomingTask,
};
use utoipa::{OpenApi, ToSchema};

use crate::error::ErrorBody;
use crate::web::{ai, dashboard, flashcards, notes, questions, study_plans, subjects, summaries};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        subjects::list_subjects,
        subjects::get_subject,
        subjects::create_subject,
        subjects::update_subject,
        subjects::delete_subject,
        notes::list_notes,
        notes::get_note,
        notes::create_note,
        notes::upload_note,
        notes::delete_note,
        summaries::list_summaries,
        summaries::get_summary,
        summaries::delete_summary,
        flashcards::list_flashcards,
        flashcards::get_flashcard,
        flashcards::update_flashcard,
        flashcards::delete_flashcard,
        questions::list_questions,
        questions::get_question,
        questions::delete_question,
        study_plans::list_study_plans,
        study_plans::get_study_plan,
        study_plans::update_study_task,
        study_plans::delete_study_plan,
        dashboard::dashboard_stats,
        ai::summarize,
        ai::chat,
        ai::generate_flashcards,
        ai::generate_questions,
        ai::generate_study_plan,
    ),
    components(
        schemas(
            HealthResponse, ErrorBody,
            Subject, NewSubject, SubjectPatch,
            Note, NewNote,
            Summary, Definition,
            Flashcard, FlashcardPatch, Difficulty,
            Question, QuestionType,
            StudyPlan, StudyTask, StudyTaskPatch, Priority,
            DashboardStats, UpcomingTask,
            ChatTurn, ChatRole,
            ai::SummarizeRequest, ai::ChatRequest, ai::ChatResponse,
            ai::GenerateFlashcardsRequest, ai::GenerateQuestionsRequest,
            ai::GenerateStudyPlanRequest,
        )
    ),
    tags(
        (name = "StudySpark API", description = "Notes, AI summaries, flashcards, practice questions and study plans.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Service Handlers
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "service",
    responses((status = 200, description = "The server is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
