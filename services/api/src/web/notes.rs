//! services/api/src/web/notes.rs
//!
//! Handlers for `/api/notes`, including the multipart upload path.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use studyspark_core::domain::{NewNote, Note};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::{
    state::AppState,
    validation::{Validate, ValidJson},
    SubjectFilter,
};

/// List notes, optionally for one subject.
#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "notes",
    params(SubjectFilter),
    responses((status = 200, description = "Matching notes, newest first", body = Vec<Note>))
)]
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SubjectFilter>,
) -> HttpResult<Json<Vec<Note>>> {
    Ok(Json(state.storage.get_notes(filter.subject_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    tag = "notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "The note", body = Note),
        (status = 404, description = "Note not found", body = ErrorBody)
    )
)]
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<Json<Note>> {
    state
        .storage
        .get_note(id)
        .await?
        .map(Json)
        .ok_or(HttpError::NotFound("Note"))
}

/// Store pasted text as a note.
#[utoipa::path(
    post,
    path = "/api/notes",
    tag = "notes",
    request_body = NewNote,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Invalid note", body = ErrorBody),
        (status = 404, description = "Subject not found", body = ErrorBody)
    )
)]
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    ValidJson(input): ValidJson<NewNote>,
) -> HttpResult<impl IntoResponse> {
    let note = store_note(&state, input).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Create a note from an uploaded text file.
///
/// Form fields: `file` (required), `subjectId` (required) and `title` (defaults to the
/// file name without its extension). Only UTF-8 text is accepted.
#[utoipa::path(
    post,
    path = "/api/notes/upload",
    tag = "notes",
    request_body(content_type = "multipart/form-data", description = "The file to store as a note."),
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Missing field or unreadable file", body = ErrorBody),
        (status = 404, description = "Subject not found", body = ErrorBody)
    )
)]
pub async fn upload_note(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> HttpResult<impl IntoResponse> {
    let mut file: Option<(Option<String>, String)> = None;
    let mut subject_id: Option<String> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(unreadable_form)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(unreadable_form)?;
                let text = String::from_utf8(data.to_vec()).map_err(|_| {
                    HttpError::bad_request("Uploaded file is not valid UTF-8 text")
                })?;
                file = Some((file_name, text));
            }
            "subjectId" => {
                subject_id = Some(field.text().await.map_err(unreadable_form)?);
            }
            "title" => {
                title = Some(field.text().await.map_err(unreadable_form)?);
            }
            other => warn!("Ignoring unexpected upload field '{}'", other),
        }
    }

    let (file_name, content) = file.ok_or_else(|| HttpError::bad_request("file is required"))?;
    let subject_id = subject_id
        .ok_or_else(|| HttpError::bad_request("subjectId is required"))?
        .trim()
        .parse::<Uuid>()
        .map_err(|_| HttpError::bad_request("subjectId must be a UUID"))?;

    let stem = file_name
        .as_deref()
        .and_then(|n| std::path::Path::new(n).file_stem())
        .and_then(|s| s.to_str())
        .map(str::to_string);
    let title = title
        .filter(|t| !t.trim().is_empty())
        .or(stem)
        .unwrap_or_else(|| "Untitled".to_string());

    let input = NewNote {
        subject_id,
        title,
        content,
        file_type: file_type_of(file_name.as_deref()),
        file_name,
    };
    input.validate().map_err(HttpError::BadRequest)?;

    let note = store_note(&state, input).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    tag = "notes",
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found", body = ErrorBody)
    )
)]
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    if state.storage.delete_note(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound("Note"))
    }
}

async fn store_note(state: &AppState, input: NewNote) -> HttpResult<Note> {
    if state.storage.get_subject(input.subject_id).await?.is_none() {
        return Err(HttpError::NotFound("Subject"));
    }
    let note = state.storage.create_note(input).await?;
    info!("Stored note '{}' under subject {}", note.title, note.subject_id);
    Ok(note)
}

fn unreadable_form(e: MultipartError) -> HttpError {
    HttpError::bad_request(e.body_text())
}

/// Lower-cased file extension, or `text` when there is none.
fn file_type_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|n| std::path::Path::new(n).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string())
}

#[cfg(test)]
mod tests {
    use super::file_type_of;

    #[test]
    fn file_type_comes_from_the_extension() {
        assert_eq!(file_type_of(Some("cells.MD")), "md");
        assert_eq!(file_type_of(Some("README")), "text");
        assert_eq!(file_type_of(None), "text");
    }
}
