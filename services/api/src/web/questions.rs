//! services/api/src/web/questions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use studyspark_core::domain::Question;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::{state::AppState, SubjectFilter};

#[utoipa::path(
    get,
    path = "/api/questions",
    tag = "questions",
    params(SubjectFilter),
    responses((status = 200, description = "Matching practice questions", body = Vec<Question>))
)]
pub async fn list_questions(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SubjectFilter>,
) -> HttpResult<Json<Vec<Question>>> {
    Ok(Json(state.storage.get_questions(filter.subject_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    tag = "questions",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 200, description = "The question", body = Question),
        (status = 404, description = "Question not found", body = ErrorBody)
    )
)]
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<Question>> {
    state
        .storage
        .get_question(id)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound("Question"))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    tag = "questions",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found", body = ErrorBody)
    )
)]
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    if state.storage.delete_question(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound("Question"))
    }
}
