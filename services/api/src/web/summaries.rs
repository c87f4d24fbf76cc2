//! services/api/src/web/summaries.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use studyspark_core::domain::Summary;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::{state::AppState, SubjectFilter};

/// List summaries, newest first.
#[utoipa::path(
    get,
    path = "/api/summaries",
    tag = "summaries",
    params(SubjectFilter),
    responses((status = 200, description = "Matching summaries", body = Vec<Summary>))
)]
pub async fn list_summaries(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SubjectFilter>,
) -> HttpResult<Json<Vec<Summary>>> {
    Ok(Json(state.storage.get_summaries(filter.subject_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/summaries/{id}",
    tag = "summaries",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 200, description = "The summary", body = Summary),
        (status = 404, description = "Summary not found", body = ErrorBody)
    )
)]
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<Summary>> {
    state
        .storage
        .get_summary(id)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound("Summary"))
}

#[utoipa::path(
    delete,
    path = "/api/summaries/{id}",
    tag = "summaries",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 204, description = "Summary deleted"),
        (status = 404, description = "Summary not found", body = ErrorBody)
    )
)]
pub async fn delete_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    if state.storage.delete_summary(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound("Summary"))
    }
}
