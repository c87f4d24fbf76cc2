//! services/api/src/web/study_plans.rs
//!
//! Handlers for `/api/study-plans`. Plans are created through `/api/ai/study-plan`;
//! afterwards only their tasks change.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use studyspark_core::domain::{StudyPlan, StudyTask, StudyTaskPatch};
use tracing::info;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::{state::AppState, validation::ValidJson};

#[utoipa::path(
    get,
    path = "/api/study-plans",
    tag = "study-plans",
    responses((status = 200, description = "All study plans, newest first", body = Vec<StudyPlan>))
)]
pub async fn list_study_plans(
    State(state): State<Arc<AppState>>,
) -> HttpResult<Json<Vec<StudyPlan>>> {
    Ok(Json(state.storage.get_study_plans().await?))
}

#[utoipa::path(
    get,
    path = "/api/study-plans/{id}",
    tag = "study-plans",
    params(("id" = Uuid, Path, description = "Study plan id")),
    responses(
        (status = 200, description = "The study plan", body = StudyPlan),
        (status = 404, description = "Study plan not found", body = ErrorBody)
    )
)]
pub async fn get_study_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<StudyPlan>> {
    state
        .storage
        .get_study_plan(id)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound("Study plan"))
}

/// Update one task inside a plan, typically to mark it completed.
#[utoipa::path(
    patch,
    path = "/api/study-plans/{plan_id}/tasks/{task_id}",
    tag = "study-plans",
    params(
        ("plan_id" = Uuid, Path, description = "Study plan id"),
        ("task_id" = Uuid, Path, description = "Task id within the plan")
    ),
    request_body = StudyTaskPatch,
    responses(
        (status = 200, description = "Updated task", body = StudyTask),
        (status = 400, description = "Invalid update", body = ErrorBody),
        (status = 404, description = "Plan or task not found", body = ErrorBody)
    )
)]
pub async fn update_study_task(
    State(state): State<Arc<AppState>>,
    Path((plan_id, task_id)): Path<(Uuid, Uuid)>,
    ValidJson(patch): ValidJson<StudyTaskPatch>,
) -> HttpResult<Json<StudyTask>> {
    let task = state
        .storage
        .update_study_task(plan_id, task_id, patch)
        .await?
        .ok_or(HttpError::NotFound("Study task"))?;
    info!(
        "Task {} of plan {} is now {}",
        task.id,
        plan_id,
        if task.completed { "completed" } else { "open" }
    );
    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/api/study-plans/{id}",
    tag = "study-plans",
    params(("id" = Uuid, Path, description = "Study plan id")),
    responses(
        (status = 204, description = "Study plan deleted"),
        (status = 404, description = "Study plan not found", body = ErrorBody)
    )
)]
pub async fn delete_study_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    if state.storage.delete_study_plan(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound("Study plan"))
    }
}
