//! services/api/src/web/flashcards.rs
//!
//! Handlers for `/api/flashcards`. Reviewing a card is a `PATCH` that carries the
//! learner's difficulty rating; it bumps the review counter and timestamp.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use studyspark_core::domain::{Flashcard, FlashcardPatch};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::{state::AppState, validation::ValidJson, SubjectFilter};

#[utoipa::path(
    get,
    path = "/api/flashcards",
    tag = "flashcards",
    params(SubjectFilter),
    responses((status = 200, description = "Matching flashcards", body = Vec<Flashcard>))
)]
pub async fn list_flashcards(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SubjectFilter>,
) -> HttpResult<Json<Vec<Flashcard>>> {
    Ok(Json(state.storage.get_flashcards(filter.subject_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/flashcards/{id}",
    tag = "flashcards",
    params(("id" = Uuid, Path, description = "Flashcard id")),
    responses(
        (status = 200, description = "The flashcard", body = Flashcard),
        (status = 404, description = "Flashcard not found", body = ErrorBody)
    )
)]
pub async fn get_flashcard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<Flashcard>> {
    state
        .storage
        .get_flashcard(id)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound("Flashcard"))
}

/// Edit a card or record a review.
#[utoipa::path(
    patch,
    path = "/api/flashcards/{id}",
    tag = "flashcards",
    params(("id" = Uuid, Path, description = "Flashcard id")),
    request_body = FlashcardPatch,
    responses(
        (status = 200, description = "Updated flashcard", body = Flashcard),
        (status = 400, description = "Invalid update", body = ErrorBody),
        (status = 404, description = "Flashcard not found", body = ErrorBody)
    )
)]
pub async fn update_flashcard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidJson(patch): ValidJson<FlashcardPatch>,
) -> HttpResult<Json<Flashcard>> {
    let card = state
        .storage
        .update_flashcard(id, patch)
        .await?
        .ok_or(HttpError::NotFound("Flashcard"))?;
    debug!("Flashcard {} reviewed {} times", card.id, card.times_reviewed);
    Ok(Json(card))
}

#[utoipa::path(
    delete,
    path = "/api/flashcards/{id}",
    tag = "flashcards",
    params(("id" = Uuid, Path, description = "Flashcard id")),
    responses(
        (status = 204, description = "Flashcard deleted"),
        (status = 404, description = "Flashcard not found", body = ErrorBody)
    )
)]
pub async fn delete_flashcard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    if state.storage.delete_flashcard(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound("Flashcard"))
    }
}
