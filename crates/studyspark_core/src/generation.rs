//! crates/studyspark_core/src/generation.rs
//!
//! Limits and reply parsing for the AI gateway.
//!
//! Model replies are decoded in two steps: the text must be a JSON document (an
//! empty reply counts as `{}`), then every expected field is read on its own and
//! replaced by a fixed fallback when it is missing or has the wrong shape. A
//! partial reply therefore never turns into an error.

use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::dashboard::{format_date, DATE_FORMAT};
use crate::domain::{
    Definition, Difficulty, FlashcardDraft, NewStudyPlan, Priority, QuestionDraft, QuestionType,
    StudyTask, SummaryContent,
};

/// Character budget for note content sent to the summarizer.
pub const SUMMARY_CONTENT_LIMIT: usize = 3000;
/// Character budget for content sent to the flashcard and question generators.
pub const GENERATION_CONTENT_LIMIT: usize = 2000;
pub const MAX_FLASHCARDS: usize = 10;
pub const MAX_QUESTIONS: usize = 8;
/// Default plan length when the model leaves out an end date.
pub const DEFAULT_PLAN_DAYS: i64 = 7;

pub const SUMMARY_FALLBACK: &str = "Summary not available.";
pub const CHAT_FALLBACK: &str = "I'm sorry, I couldn't come up with a response. Please try again.";
pub const PLAN_TITLE_FALLBACK: &str = "Study Plan";
pub const TASK_TOPIC_FALLBACK: &str = "Study session";
pub const TASK_SUBJECT_FALLBACK: &str = "General";
pub const TASK_DURATION_FALLBACK: u32 = 60;

/// Truncates to at most `limit` characters, never splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn clamp_flashcard_count(requested: usize) -> usize {
    requested.min(MAX_FLASHCARDS)
}

pub fn clamp_question_count(requested: usize) -> usize {
    requested.min(MAX_QUESTIONS)
}

//=========================================================================================
// Field Helpers
//=========================================================================================

/// Decodes a reply into a JSON object. Blank replies and non-object documents
/// yield an empty object so that every field falls back to its default.
fn parse_object(raw: &str) -> Result<Map<String, Value>, serde_json::Error> {
    let trimmed = strip_code_fence(raw.trim());
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(trimmed)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Some models wrap JSON in a Markdown code fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn object_list<'a>(obj: &'a Map<String, Value>, key: &str) -> Vec<&'a Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn difficulty_field(obj: &Map<String, Value>) -> Difficulty {
    text_field(obj, "difficulty")
        .and_then(|d| d.parse().ok())
        .unwrap_or_default()
}

//=========================================================================================
// Reply Parsers
//=========================================================================================

/// `{keyPoints, definitions: [{term, definition}], formulas, mainConcepts, fullSummary}`
pub fn parse_summary(raw: &str) -> Result<SummaryContent, serde_json::Error> {
    let obj = parse_object(raw)?;

    let definitions = object_list(&obj, "definitions")
        .into_iter()
        .filter_map(|d| {
            Some(Definition {
                term: text_field(d, "term")?,
                definition: text_field(d, "definition")?,
            })
        })
        .collect();

    Ok(SummaryContent {
        key_points: text_list(&obj, "keyPoints"),
        definitions,
        formulas: text_list(&obj, "formulas"),
        main_concepts: text_list(&obj, "mainConcepts"),
        full_summary: text_field(&obj, "fullSummary")
            .unwrap_or_else(|| SUMMARY_FALLBACK.to_string()),
    })
}

/// `{flashcards: [{front, back, difficulty}]}`. Cards without both sides are dropped.
pub fn parse_flashcards(raw: &str, limit: usize) -> Result<Vec<FlashcardDraft>, serde_json::Error> {
    let obj = parse_object(raw)?;

    Ok(object_list(&obj, "flashcards")
        .into_iter()
        .filter_map(|card| {
            Some(FlashcardDraft {
                front: text_field(card, "front")?,
                back: text_field(card, "back")?,
                difficulty: difficulty_field(card),
            })
        })
        .take(limit)
        .collect())
}

/// `{questions: [{type, question, options, answer, explanation, difficulty}]}`.
///
/// An unknown or missing `type` falls back to the first requested type. Entries
/// without question text or an answer are dropped.
pub fn parse_questions(
    raw: &str,
    requested: &[QuestionType],
    limit: usize,
) -> Result<Vec<QuestionDraft>, serde_json::Error> {
    let obj = parse_object(raw)?;
    let fallback_type = requested.first().copied().unwrap_or(QuestionType::Short);

    Ok(object_list(&obj, "questions")
        .into_iter()
        .filter_map(|q| {
            let options = text_list(q, "options");
            Some(QuestionDraft {
                question_type: text_field(q, "type")
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(fallback_type),
                question: text_field(q, "question")?,
                options: (!options.is_empty()).then_some(options),
                answer: text_field(q, "answer")?,
                explanation: text_field(q, "explanation"),
                difficulty: difficulty_field(q),
            })
        })
        .take(limit)
        .collect())
}

/// `{title, description, startDate, endDate, tasks: [...]}`.
///
/// `today` seeds the date fallbacks: start defaults to today, end to today plus
/// [`DEFAULT_PLAN_DAYS`], and a task without a date is scheduled on the start date.
/// Dates that do not parse are treated as missing; the rest are re-emitted as
/// zero-padded `YYYY-MM-DD` so they compare correctly as strings.
pub fn parse_study_plan(raw: &str, today: NaiveDate) -> Result<NewStudyPlan, serde_json::Error> {
    let obj = parse_object(raw)?;
    let start_date = date_field(&obj, "startDate").unwrap_or_else(|| format_date(today));
    let end_date = date_field(&obj, "endDate")
        .unwrap_or_else(|| format_date(today + Duration::days(DEFAULT_PLAN_DAYS)));

    let tasks = object_list(&obj, "tasks")
        .into_iter()
        .map(|task| StudyTask {
            id: Uuid::new_v4(),
            topic: text_field(task, "topic").unwrap_or_else(|| TASK_TOPIC_FALLBACK.to_string()),
            subject: text_field(task, "subject")
                .unwrap_or_else(|| TASK_SUBJECT_FALLBACK.to_string()),
            duration: duration_field(task).unwrap_or(TASK_DURATION_FALLBACK),
            priority: text_field(task, "priority")
                .and_then(|p| p.parse::<Priority>().ok())
                .unwrap_or_default(),
            completed: false,
            date: date_field(task, "date").unwrap_or_else(|| start_date.clone()),
            time_slot: text_field(task, "timeSlot"),
        })
        .collect();

    Ok(NewStudyPlan {
        title: text_field(&obj, "title").unwrap_or_else(|| PLAN_TITLE_FALLBACK.to_string()),
        description: text_field(&obj, "description").unwrap_or_default(),
        start_date,
        end_date,
        tasks,
    })
}

fn date_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    let text = text_field(obj, key)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .ok()
        .map(format_date)
}

/// Minutes, given either as a number or as text like "45" or "45 minutes".
fn duration_field(obj: &Map<String, Value>) -> Option<u32> {
    let minutes = match obj.get("duration")? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|first| first.parse::<u32>().ok()),
        _ => None,
    };
    minutes.filter(|m| *m > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars(&"a".repeat(2500), GENERATION_CONTENT_LIMIT).len(), 2000);
    }

    #[test]
    fn counts_are_clamped() {
        assert_eq!(clamp_flashcard_count(25), MAX_FLASHCARDS);
        assert_eq!(clamp_flashcard_count(3), 3);
        assert_eq!(clamp_question_count(20), MAX_QUESTIONS);
    }

    #[test]
    fn summary_missing_definitions_defaults_to_empty() {
        let raw = json!({
            "keyPoints": ["Cells are the basic unit of life"],
            "formulas": [],
            "mainConcepts": ["Cell theory"],
            "fullSummary": "All living things are made of cells."
        })
        .to_string();

        let summary = parse_summary(&raw).unwrap();
        assert!(summary.definitions.is_empty());
        assert_eq!(summary.key_points, vec!["Cells are the basic unit of life"]);
        assert_eq!(summary.full_summary, "All living things are made of cells.");
    }

    #[test]
    fn empty_summary_reply_uses_every_fallback() {
        let summary = parse_summary("").unwrap();
        assert_eq!(summary.full_summary, SUMMARY_FALLBACK);
        assert!(summary.key_points.is_empty());
        assert!(summary.formulas.is_empty());
        assert!(summary.main_concepts.is_empty());
    }

    #[test]
    fn summary_skips_malformed_definitions() {
        let raw = r#"{"definitions": [{"term": "Mitosis", "definition": "Cell division"}, {"term": "Orphan"}, "bad"], "fullSummary": "  "}"#;
        let summary = parse_summary(raw).unwrap();
        assert_eq!(
            summary.definitions,
            vec![Definition {
                term: "Mitosis".to_string(),
                definition: "Cell division".to_string()
            }]
        );
        assert_eq!(summary.full_summary, SUMMARY_FALLBACK);
    }

    #[test]
    fn non_json_reply_is_an_error() {
        assert!(parse_summary("Here is your summary!").is_err());
        assert!(parse_flashcards("{not json", 5).is_err());
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"fullSummary\": \"Fenced\"}\n```";
        assert_eq!(parse_summary(raw).unwrap().full_summary, "Fenced");
    }

    #[test]
    fn flashcards_are_limited_and_defaulted() {
        let cards: Vec<Value> = (0..15)
            .map(|i| json!({"front": format!("Q{i}"), "back": format!("A{i}")}))
            .collect();
        let raw = json!({ "flashcards": cards }).to_string();

        let parsed = parse_flashcards(&raw, clamp_flashcard_count(25)).unwrap();
        assert_eq!(parsed.len(), MAX_FLASHCARDS);
        assert!(parsed.iter().all(|c| c.difficulty == Difficulty::Medium));
        assert_eq!(parsed[0].front, "Q0");
    }

    #[test]
    fn flashcards_missing_list_is_empty() {
        assert!(parse_flashcards(r#"{"cards": []}"#, 5).unwrap().is_empty());
        assert!(parse_flashcards(r#"{"flashcards": [{"front": "only"}]}"#, 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn questions_fall_back_to_requested_type() {
        let raw = json!({
            "questions": [
                {"type": "mcq", "question": "Largest organelle?", "options": ["Nucleus", "Ribosome"], "answer": "Nucleus", "difficulty": "easy"},
                {"type": "essay", "question": "Explain ATP.", "answer": "Energy carrier"},
                {"question": "7 * 6?", "answer": 42},
                {"type": "short", "answer": "missing question"}
            ]
        })
        .to_string();

        let parsed = parse_questions(&raw, &[QuestionType::Numerical], 8).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].question_type, QuestionType::Mcq);
        assert_eq!(parsed[0].options.as_deref().map(<[String]>::len), Some(2));
        assert_eq!(parsed[0].difficulty, Difficulty::Easy);
        assert_eq!(parsed[1].question_type, QuestionType::Numerical);
        assert!(parsed[1].options.is_none());
        assert_eq!(parsed[2].answer, "42");
    }

    #[test]
    fn questions_are_limited() {
        let questions: Vec<Value> = (0..12)
            .map(|i| json!({"type": "short", "question": format!("Q{i}"), "answer": "A"}))
            .collect();
        let raw = json!({ "questions": questions }).to_string();
        let parsed = parse_questions(&raw, &[QuestionType::Short], clamp_question_count(20)).unwrap();
        assert_eq!(parsed.len(), MAX_QUESTIONS);
    }

    #[test]
    fn study_plan_dates_default_from_today() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 28).unwrap();
        let raw = json!({
            "title": "Biology finals",
            "tasks": [
                {"topic": "Photosynthesis", "subject": "Biology", "duration": "90 minutes", "priority": "high", "date": "2026-05-29", "timeSlot": "09:00-10:30"},
                {}
            ]
        })
        .to_string();

        let plan = parse_study_plan(&raw, today).unwrap();
        assert_eq!(plan.title, "Biology finals");
        assert_eq!(plan.description, "");
        assert_eq!(plan.start_date, "2026-05-28");
        assert_eq!(plan.end_date, "2026-06-04");

        let first = &plan.tasks[0];
        assert_eq!(first.duration, 90);
        assert_eq!(first.priority, Priority::High);
        assert_eq!(first.time_slot.as_deref(), Some("09:00-10:30"));

        let second = &plan.tasks[1];
        assert_eq!(second.topic, TASK_TOPIC_FALLBACK);
        assert_eq!(second.subject, TASK_SUBJECT_FALLBACK);
        assert_eq!(second.duration, TASK_DURATION_FALLBACK);
        assert_eq!(second.priority, Priority::Medium);
        assert_eq!(second.date, "2026-05-28");
        assert!(!second.completed);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn study_plan_dates_are_normalised_or_replaced() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();
        let raw = json!({
            "startDate": "June 10, 2026",
            "endDate": "2026-6-20",
            "tasks": [
                {"topic": "Past unpadded", "date": "2026-6-5"},
                {"topic": "Weekday", "date": "Monday"},
                {"topic": "Future", "date": "2026-06-12"}
            ]
        })
        .to_string();

        let plan = parse_study_plan(&raw, today).unwrap();
        assert_eq!(plan.start_date, "2026-06-10");
        assert_eq!(plan.end_date, "2026-06-20");
        assert_eq!(plan.tasks[0].date, "2026-06-05");
        assert_eq!(plan.tasks[1].date, plan.start_date);
        assert_eq!(plan.tasks[2].date, "2026-06-12");

        let stored = crate::domain::StudyPlan::new(plan);
        let upcoming = crate::dashboard::upcoming_tasks(&[stored], "2026-06-11");
        let topics: Vec<&str> = upcoming.iter().map(|u| u.task.topic.as_str()).collect();
        assert_eq!(topics, vec!["Future"]);
    }
}
