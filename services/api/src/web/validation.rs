//! services/api/src/web/validation.rs
//!
//! Request-body validation. Handlers take `ValidJson<T>` instead of `Json<T>`; the
//! body is decoded and then checked with `Validate::validate`, and either failure
//! becomes a 400 response.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use studyspark_core::dashboard::DATE_FORMAT;
use studyspark_core::domain::{FlashcardPatch, NewNote, NewSubject, StudyTaskPatch, SubjectPatch};

use crate::error::HttpError;

/// Field-level rules for a request body.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// A JSON body that has passed validation.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| HttpError::bad_request(rejection.body_text()))?;
        value.validate().map_err(HttpError::BadRequest)?;
        Ok(ValidJson(value))
    }
}

//=========================================================================================
// Rule Helpers
//=========================================================================================

pub fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{} must be at most {} characters", field, max))
    } else {
        Ok(())
    }
}

/// Plan and task dates are compared as strings, so only `YYYY-MM-DD` is accepted.
pub fn iso_date(field: &str, value: &str) -> Result<(), String> {
    let invalid = || format!("{} must be a date in YYYY-MM-DD format", field);
    // The parser also accepts unpadded months and days, which would not sort.
    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| invalid())
}

fn optional_text(field: &str, value: Option<&String>) -> Result<(), String> {
    value.map_or(Ok(()), |v| require_text(field, v))
}

//=========================================================================================
// Entity Inputs
//=========================================================================================

impl Validate for NewSubject {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        max_len("name", &self.name, 100)?;
        require_text("color", &self.color)
    }
}

impl Validate for SubjectPatch {
    fn validate(&self) -> Result<(), String> {
        optional_text("name", self.name.as_ref())?;
        if let Some(name) = &self.name {
            max_len("name", name, 100)?;
        }
        optional_text("icon", self.icon.as_ref())?;
        optional_text("color", self.color.as_ref())
    }
}

impl Validate for NewNote {
    fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        max_len("title", &self.title, 200)?;
        require_text("content", &self.content)?;
        require_text("fileType", &self.file_type)
    }
}

impl Validate for FlashcardPatch {
    fn validate(&self) -> Result<(), String> {
        optional_text("front", self.front.as_ref())?;
        optional_text("back", self.back.as_ref())?;
        if self.front.is_none() && self.back.is_none() && self.difficulty.is_none() {
            return Err("at least one of front, back or difficulty is required".to_string());
        }
        Ok(())
    }
}

impl Validate for StudyTaskPatch {
    fn validate(&self) -> Result<(), String> {
        optional_text("topic", self.topic.as_ref())?;
        optional_text("subject", self.subject.as_ref())?;
        if let Some(date) = &self.date {
            iso_date("date", date)?;
        }
        if self.duration == Some(0) {
            return Err("duration must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyspark_core::domain::Difficulty;
    use uuid::Uuid;

    #[test]
    fn subject_requires_a_name() {
        let subject: NewSubject = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert_eq!(subject.validate().unwrap_err(), "name is required");

        let subject: NewSubject =
            serde_json::from_str(r#"{"name": "Biology", "color": "green"}"#).unwrap();
        assert!(subject.validate().is_ok());
        assert_eq!(subject.icon, "book");
    }

    #[test]
    fn note_requires_content() {
        let note = NewNote {
            subject_id: Uuid::new_v4(),
            title: "Cells".to_string(),
            content: String::new(),
            file_type: "text".to_string(),
            file_name: None,
        };
        assert_eq!(note.validate().unwrap_err(), "content is required");
    }

    #[test]
    fn empty_flashcard_patch_is_rejected() {
        assert!(FlashcardPatch::default().validate().is_err());
        let patch = FlashcardPatch {
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn task_dates_must_be_sortable() {
        let patch = StudyTaskPatch {
            date: Some("6/1/2026".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = StudyTaskPatch {
            date: Some("2026-06-01".to_string()),
            completed: Some(true),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}
