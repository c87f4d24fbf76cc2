//! services/api/src/web/mod.rs
//!
//! HTTP layer: one module of handlers per resource family and the router that
//! mounts them under `/api`.

pub mod ai;
pub mod dashboard;
pub mod flashcards;
pub mod notes;
pub mod questions;
pub mod rest;
pub mod state;
pub mod study_plans;
pub mod subjects;
pub mod summaries;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::config::DEFAULT_CORS_ORIGIN;
use state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Optional `?subjectId=` filter shared by the list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubjectFilter {
    /// Only return records belonging to this subject.
    pub subject_id: Option<Uuid>,
}

/// Builds the complete application router.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(rest::health))
        .route("/openapi.json", get(rest::openapi_json))
        .route(
            "/subjects",
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route(
            "/subjects/{id}",
            get(subjects::get_subject)
                .patch(subjects::update_subject)
                .delete(subjects::delete_subject),
        )
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        .route("/notes/upload", post(notes::upload_note))
        .route(
            "/notes/{id}",
            get(notes::get_note).delete(notes::delete_note),
        )
        .route("/summaries", get(summaries::list_summaries))
        .route(
            "/summaries/{id}",
            get(summaries::get_summary).delete(summaries::delete_summary),
        )
        .route("/flashcards", get(flashcards::list_flashcards))
        .route(
            "/flashcards/{id}",
            get(flashcards::get_flashcard)
                .patch(flashcards::update_flashcard)
                .delete(flashcards::delete_flashcard),
        )
        .route("/questions", get(questions::list_questions))
        .route(
            "/questions/{id}",
            get(questions::get_question).delete(questions::delete_question),
        )
        .route("/study-plans", get(study_plans::list_study_plans))
        .route(
            "/study-plans/{id}",
            get(study_plans::get_study_plan).delete(study_plans::delete_study_plan),
        )
        .route(
            "/study-plans/{plan_id}/tasks/{task_id}",
            patch(study_plans::update_study_task),
        )
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
        .route("/ai/summarize", post(ai::summarize))
        .route("/ai/chat", post(ai::chat))
        .route("/ai/flashcards", post(ai::generate_flashcards))
        .route("/ai/questions", post(ai::generate_questions))
        .route("/ai/study-plan", post(ai::generate_study_plan));

    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let origin = origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        warn!(
            "CORS_ORIGIN '{}' is not a valid header value, using {}",
            origin, DEFAULT_CORS_ORIGIN
        );
        HeaderValue::from_static(DEFAULT_CORS_ORIGIN)
    });
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
}
