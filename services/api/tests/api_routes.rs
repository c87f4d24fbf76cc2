//! Drives the full router against the in-memory store and a scripted AI service.

use api_lib::{adapters::MemoryStorage, config::Config, web};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use studyspark_core::{
    domain::{
        ChatTurn, Definition, Difficulty, FlashcardDraft, NewStudyPlan, Priority, QuestionDraft,
        QuestionType, StudyTask, SummaryContent,
    },
    generation::{MAX_FLASHCARDS, MAX_QUESTIONS},
    ports::{PortError, PortResult, StudyAiService},
};
use tower::ServiceExt;
use uuid::Uuid;

/// Answers every call with canned content shaped like a real model reply.
struct ScriptedAi {
    fail: bool,
}

#[async_trait]
impl StudyAiService for ScriptedAi {
    async fn summarize(&self, _content: &str, title: &str) -> PortResult<SummaryContent> {
        if self.fail {
            return Err(PortError::Provider("Failed to summarize content: 401".to_string()));
        }
        Ok(SummaryContent {
            key_points: vec!["Cells are the basic unit of life".to_string()],
            definitions: vec![Definition {
                term: "Mitochondria".to_string(),
                definition: "The powerhouse of the cell".to_string(),
            }],
            formulas: Vec::new(),
            main_concepts: vec!["Cell theory".to_string()],
            full_summary: format!("{} covers how cells are organised.", title),
        })
    }

    async fn chat(&self, message: &str, history: &[ChatTurn]) -> PortResult<String> {
        Ok(format!("({} earlier turns) You asked: {}", history.len(), message))
    }

    async fn generate_flashcards(
        &self,
        _content: &str,
        count: usize,
    ) -> PortResult<Vec<FlashcardDraft>> {
        Ok((0..count.min(MAX_FLASHCARDS))
            .map(|i| FlashcardDraft {
                front: format!("Question {}", i),
                back: format!("Answer {}", i),
                difficulty: Difficulty::Medium,
            })
            .collect())
    }

    async fn generate_questions(
        &self,
        _content: &str,
        types: &[QuestionType],
        count: usize,
    ) -> PortResult<Vec<QuestionDraft>> {
        let kind = types.first().copied().unwrap_or(QuestionType::Short);
        Ok((0..count.min(MAX_QUESTIONS))
            .map(|i| QuestionDraft {
                question_type: kind,
                question: format!("What is {}?", i),
                options: (kind == QuestionType::Mcq)
                    .then(|| vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()]),
                answer: "A".to_string(),
                explanation: None,
                difficulty: Difficulty::Easy,
            })
            .collect())
    }

    async fn generate_study_plan(
        &self,
        _prompt: &str,
        subjects: &[String],
    ) -> PortResult<NewStudyPlan> {
        let subject = subjects.first().cloned().unwrap_or_else(|| "General".to_string());
        let task = |topic: &str, date: &str| StudyTask {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            subject: subject.clone(),
            duration: 45,
            priority: Priority::High,
            completed: false,
            date: date.to_string(),
            time_slot: Some("09:00-09:45".to_string()),
        };
        Ok(NewStudyPlan {
            title: "Exam prep".to_string(),
            description: "Two sessions".to_string(),
            start_date: "2099-01-01".to_string(),
            end_date: "2099-01-02".to_string(),
            tasks: vec![task("Cell structure", "2099-01-01"), task("Mitosis", "2099-01-02")],
        })
    }
}

fn app_with(ai: ScriptedAi) -> Router {
    let state = web::state::AppState::new(
        Arc::new(MemoryStorage::default()),
        Arc::new(ai),
        Arc::new(Config::default()),
    );
    web::router(Arc::new(state))
}

fn app() -> Router {
    app_with(ScriptedAi { fail: false })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    read(app.clone().oneshot(request).await.unwrap()).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_subject(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/subjects",
        Some(json!({ "name": name, "color": "green" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_note(app: &Router, subject_id: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/notes",
        Some(json!({
            "subjectId": subject_id,
            "title": "Cell Biology",
            "content": "Cells are the basic unit of life. Mitochondria produce ATP.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn note_to_summary_flow() {
    let app = app();
    let subject_id = create_subject(&app, "Biology").await;
    let note_id = create_note(&app, &subject_id).await;

    let (_, subject) = send(&app, Method::GET, &format!("/api/subjects/{}", subject_id), None).await;
    assert_eq!(subject["notesCount"], 1);
    assert_eq!(subject["icon"], "book");

    let (status, summary) = send(
        &app,
        Method::POST,
        "/api/ai/summarize",
        Some(json!({ "noteId": note_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["subjectId"], subject_id.as_str());
    assert_eq!(summary["noteId"], note_id.as_str());
    assert_eq!(summary["title"], "Cell Biology");
    assert!(!summary["fullSummary"].as_str().unwrap().is_empty());
    assert_eq!(summary["definitions"][0]["term"], "Mitochondria");

    let (status, listed) = send(
        &app,
        Method::GET,
        &format!("/api/summaries?subjectId={}", subject_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/api/subjects", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");

    let (status, body) = send(&app, Method::POST, "/api/subjects", Some(json!({ "color": "red" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ai/chat",
        Some(json!({ "message": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_records_are_404() {
    let app = app();
    let missing = Uuid::new_v4();

    let (status, body) = send(&app, Method::GET, &format!("/api/subjects/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Subject not found");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(json!({ "subjectId": missing, "title": "Orphan", "content": "text" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ai/summarize",
        Some(json!({ "noteId": missing })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/notes/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn provider_failure_is_a_generic_500() {
    let app = app_with(ScriptedAi { fail: true });
    let subject_id = create_subject(&app, "Biology").await;
    let note_id = create_note(&app, &subject_id).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ai/summarize",
        Some(json!({ "noteId": note_id })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "AI request failed");

    let (_, summaries) = send(&app, Method::GET, "/api/summaries", None).await;
    assert!(summaries.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_subject_removes_its_notes() {
    let app = app();
    let subject_id = create_subject(&app, "Chemistry").await;
    let note_id = create_note(&app, &subject_id).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/subjects/{}", subject_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &format!("/api/notes/{}", note_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/api/subjects/{}", subject_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generated_flashcards_are_stored_and_counted() {
    let app = app();
    let subject_id = create_subject(&app, "Biology").await;

    let (status, cards) = send(
        &app,
        Method::POST,
        "/api/ai/flashcards",
        Some(json!({ "subjectId": subject_id, "content": "Cells", "count": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), MAX_FLASHCARDS);

    let (_, subject) = send(&app, Method::GET, &format!("/api/subjects/{}", subject_id), None).await;
    assert_eq!(subject["flashcardsCount"], MAX_FLASHCARDS as i64);

    let card_id = cards[0]["id"].as_str().unwrap();
    let (status, card) = send(
        &app,
        Method::PATCH,
        &format!("/api/flashcards/{}", card_id),
        Some(json!({ "difficulty": "hard" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["difficulty"], "hard");
    assert_eq!(card["timesReviewed"], 1);
    assert!(card["lastReviewed"].is_string());

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/flashcards/{}", card_id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn questions_default_to_mcq_first() {
    let app = app();
    let subject_id = create_subject(&app, "Physics").await;

    let (status, questions) = send(
        &app,
        Method::POST,
        "/api/ai/questions",
        Some(json!({ "subjectId": subject_id, "content": "Newton's laws" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let questions = questions.as_array().unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[0]["type"], "mcq");
    assert_eq!(questions[0]["options"].as_array().unwrap().len(), 4);

    let (_, subject) = send(&app, Method::GET, &format!("/api/subjects/{}", subject_id), None).await;
    assert_eq!(subject["questionsCount"], 5);
}

#[tokio::test]
async fn generation_from_unknown_summary_is_404() {
    let app = app();
    let subject_id = create_subject(&app, "Physics").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ai/flashcards",
        Some(json!({ "subjectId": subject_id, "summaryId": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ai/questions",
        Some(json!({
            "subjectId": subject_id,
            "summaryId": Uuid::new_v4(),
            "content": "Newton's laws",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, questions) = send(&app, Method::GET, "/api/questions", None).await;
    assert!(questions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn summary_from_another_subject_is_rejected() {
    let app = app();
    let biology = create_subject(&app, "Biology").await;
    let physics = create_subject(&app, "Physics").await;
    let note_id = create_note(&app, &biology).await;
    let (_, summary) = send(
        &app,
        Method::POST,
        "/api/ai/summarize",
        Some(json!({ "noteId": note_id })),
    )
    .await;
    let summary_id = summary["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ai/flashcards",
        Some(json!({ "subjectId": physics, "summaryId": summary_id, "content": "Forces" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "summaryId belongs to a different subject");

    let (status, cards) = send(
        &app,
        Method::POST,
        "/api/ai/flashcards",
        Some(json!({ "subjectId": biology, "summaryId": summary_id, "count": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cards[0]["summaryId"], summary_id);
}

#[tokio::test]
async fn completing_a_task_updates_plan_and_dashboard() {
    let app = app();
    create_subject(&app, "Biology").await;

    let (status, plan) = send(
        &app,
        Method::POST,
        "/api/ai/study-plan",
        Some(json!({ "prompt": "Two days before my biology exam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(plan["tasks"][0]["subject"], "Biology");
    let plan_id = plan["id"].as_str().unwrap().to_string();
    let task_id = plan["tasks"][0]["id"].as_str().unwrap().to_string();

    let (status, task) = send(
        &app,
        Method::PATCH,
        &format!("/api/study-plans/{}/tasks/{}", plan_id, task_id),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["completed"], true);
    assert_eq!(task["topic"], "Cell structure");

    let (_, plan) = send(&app, Method::GET, &format!("/api/study-plans/{}", plan_id), None).await;
    assert_eq!(plan["tasks"][0]["completed"], true);
    assert_eq!(plan["tasks"][1]["completed"], false);

    let (status, stats) = send(&app, Method::GET, "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalSubjects"], 1);
    assert_eq!(stats["studyStreak"], 0);
    let upcoming = stats["upcomingTasks"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["topic"], "Mitosis");
    assert_eq!(upcoming[0]["planId"], plan_id.as_str());

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/study-plans/{}/tasks/{}", plan_id, Uuid::new_v4()),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_passes_history_through() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ai/chat",
        Some(json!({
            "message": "What is ATP?",
            "history": [
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello! What are we studying?" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "(2 earlier turns) You asked: What is ATP?");
}

fn multipart_request(subject_id: &str, file_name: &str, file: &[u8]) -> Request<Body> {
    let boundary = "studyspark-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"subjectId\"\r\n\r\n{id}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
             Content-Type: text/plain\r\n\r\n",
            b = boundary,
            id = subject_id,
            name = file_name,
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/notes/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn uploading_a_text_file_creates_a_note() {
    let app = app();
    let subject_id = create_subject(&app, "Biology").await;

    let request = multipart_request(&subject_id, "cells.md", b"# Cells\nThe basic unit of life.");
    let (status, note) = read(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["title"], "cells");
    assert_eq!(note["fileType"], "md");
    assert_eq!(note["fileName"], "cells.md");

    let request = multipart_request(&subject_id, "scan.pdf", &[0xff, 0xfe, 0x00, 0x81]);
    let (status, _) = read(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, subject) = send(&app, Method::GET, &format!("/api/subjects/{}", subject_id), None).await;
    assert_eq!(subject["notesCount"], 1);
}

#[tokio::test]
async fn service_endpoints_respond() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, doc) = send(&app, Method::GET, "/api/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/subjects"].is_object());
}
