//! services/api/src/web/subjects.rs
//!
//! Handlers for `/api/subjects`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use studyspark_core::domain::{NewSubject, Subject, SubjectPatch};
use tracing::info;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::{state::AppState, validation::ValidJson};

/// List every subject.
#[utoipa::path(
    get,
    path = "/api/subjects",
    tag = "subjects",
    responses((status = 200, description = "All subjects", body = Vec<Subject>))
)]
pub async fn list_subjects(State(state): State<Arc<AppState>>) -> HttpResult<Json<Vec<Subject>>> {
    Ok(Json(state.storage.get_subjects().await?))
}

/// Fetch one subject.
#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    tag = "subjects",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 200, description = "The subject", body = Subject),
        (status = 404, description = "Subject not found", body = ErrorBody)
    )
)]
pub async fn get_subject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<Subject>> {
    state
        .storage
        .get_subject(id)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound("Subject"))
}

/// Create a subject.
#[utoipa::path(
    post,
    path = "/api/subjects",
    tag = "subjects",
    request_body = NewSubject,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Invalid subject", body = ErrorBody)
    )
)]
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    ValidJson(input): ValidJson<NewSubject>,
) -> HttpResult<impl IntoResponse> {
    let subject = state.storage.create_subject(input).await?;
    info!("Created subject {} ({})", subject.name, subject.id);
    Ok((StatusCode::CREATED, Json(subject)))
}

/// Rename or restyle a subject.
#[utoipa::path(
    patch,
    path = "/api/subjects/{id}",
    tag = "subjects",
    params(("id" = Uuid, Path, description = "Subject id")),
    request_body = SubjectPatch,
    responses(
        (status = 200, description = "Updated subject", body = Subject),
        (status = 400, description = "Invalid update", body = ErrorBody),
        (status = 404, description = "Subject not found", body = ErrorBody)
    )
)]
pub async fn update_subject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidJson(patch): ValidJson<SubjectPatch>,
) -> HttpResult<Json<Subject>> {
    state
        .storage
        .update_subject(id, patch)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound("Subject"))
}

/// Delete a subject together with its notes, summaries, flashcards and questions.
#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    tag = "subjects",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 204, description = "Subject deleted"),
        (status = 404, description = "Subject not found", body = ErrorBody)
    )
)]
pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    if state.storage.delete_subject(id).await? {
        info!("Deleted subject {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound("Subject"))
    }
}
