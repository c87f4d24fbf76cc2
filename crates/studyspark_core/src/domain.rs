//! crates/studyspark_core/src/domain.rs
//!
//! Defines the core data structures for the application: the persisted entities,
//! the inputs used to create them, the partial updates applied to them and the
//! drafts produced by the AI gateway before they are persisted.
//!
//! Everything here serializes with camelCase field names, which is the shape the
//! single-page frontend consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Returned when a stored or model-supplied enum string is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} value: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

//=========================================================================================
// Enumerations
//=========================================================================================

/// How hard a flashcard or question is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseEnumError {
                kind: "difficulty",
                value: s.to_string(),
            }),
        }
    }
}

/// The kinds of practice question the gateway can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Short,
    Long,
    Numerical,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Short => "short",
            QuestionType::Long => "long",
            QuestionType::Numerical => "numerical",
        }
    }

    /// The human-readable description injected into the question prompt.
    pub fn prompt_description(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "multiple choice questions with 4 options",
            QuestionType::Short => "short answer questions (1-2 sentences)",
            QuestionType::Long => "long answer questions requiring a detailed explanation",
            QuestionType::Numerical => "numerical problems with a worked answer",
        }
    }
}

impl FromStr for QuestionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcq" => Ok(QuestionType::Mcq),
            "short" => Ok(QuestionType::Short),
            "long" => Ok(QuestionType::Long),
            "numerical" => Ok(QuestionType::Numerical),
            _ => Err(ParseEnumError {
                kind: "question type",
                value: s.to_string(),
            }),
        }
    }
}

/// Priority of a task inside a study plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParseEnumError {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Author of one turn in a chat history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

//=========================================================================================
// Subjects
//=========================================================================================

/// A subject groups notes, summaries, flashcards and questions.
///
/// The three counters are denormalized: they are adjusted by the storage layer each
/// time a child note, flashcard or question is created or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub notes_count: i32,
    pub flashcards_count: i32,
    pub questions_count: i32,
    pub last_accessed: DateTime<Utc>,
}

impl Subject {
    pub fn new(input: NewSubject) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            icon: input.icon,
            color: input.color,
            notes_count: 0,
            flashcards_count: 0,
            questions_count: 0,
            last_accessed: Utc::now(),
        }
    }

    /// Shallow-merges the supplied fields and refreshes `last_accessed`.
    pub fn apply(&mut self, patch: SubjectPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        self.last_accessed = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_icon() -> String {
    "book".to_string()
}

fn default_color() -> String {
    "blue".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Which denormalized counter on a subject a child record contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectCounter {
    Notes,
    Flashcards,
    Questions,
}

impl SubjectCounter {
    pub fn column(&self) -> &'static str {
        match self {
            SubjectCounter::Notes => "notes_count",
            SubjectCounter::Flashcards => "flashcards_count",
            SubjectCounter::Questions => "questions_count",
        }
    }

    pub fn read(&self, subject: &Subject) -> i32 {
        match self {
            SubjectCounter::Notes => subject.notes_count,
            SubjectCounter::Flashcards => subject.flashcards_count,
            SubjectCounter::Questions => subject.questions_count,
        }
    }

    pub fn write(&self, subject: &mut Subject, value: i32) {
        match self {
            SubjectCounter::Notes => subject.notes_count = value,
            SubjectCounter::Flashcards => subject.flashcards_count = value,
            SubjectCounter::Questions => subject.questions_count = value,
        }
    }
}

//=========================================================================================
// Notes & Summaries
//=========================================================================================

/// Study material uploaded or pasted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub content: String,
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(input: NewNote) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: input.subject_id,
            title: input.title,
            content: input.content,
            file_type: input.file_type,
            file_name: input.file_name,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub subject_id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default = "default_file_type")]
    pub file_type: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

fn default_file_type() -> String {
    "text".to_string()
}

/// A term and its definition extracted into a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Definition {
    pub term: String,
    pub definition: String,
}

/// A structured summary of a note, as produced by the AI gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: Uuid,
    pub note_id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub key_points: Vec<String>,
    pub definitions: Vec<Definition>,
    pub formulas: Vec<String>,
    pub main_concepts: Vec<String>,
    pub full_summary: String,
    pub created_at: DateTime<Utc>,
}

impl Summary {
    pub fn new(input: NewSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            note_id: input.note_id,
            subject_id: input.subject_id,
            title: input.title,
            key_points: input.content.key_points,
            definitions: input.content.definitions,
            formulas: input.content.formulas,
            main_concepts: input.content.main_concepts,
            full_summary: input.content.full_summary,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSummary {
    pub note_id: Uuid,
    pub subject_id: Uuid,
    pub title: String,
    pub content: SummaryContent,
}

/// The generated body of a summary. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryContent {
    pub key_points: Vec<String>,
    pub definitions: Vec<Definition>,
    pub formulas: Vec<String>,
    pub main_concepts: Vec<String>,
    pub full_summary: String,
}

//=========================================================================================
// Flashcards & Questions
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub subject_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_id: Option<Uuid>,
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub times_reviewed: i32,
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn new(input: NewFlashcard) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: input.subject_id,
            summary_id: input.summary_id,
            front: input.front,
            back: input.back,
            difficulty: input.difficulty,
            last_reviewed: None,
            times_reviewed: 0,
            created_at: Utc::now(),
        }
    }

    /// Shallow-merges the patch. Supplying a difficulty counts as a review.
    pub fn apply(&mut self, patch: FlashcardPatch) {
        if let Some(front) = patch.front {
            self.front = front;
        }
        if let Some(back) = patch.back {
            self.back = back;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
            self.last_reviewed = Some(Utc::now());
            self.times_reviewed += 1;
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFlashcard {
    pub subject_id: Uuid,
    #[serde(default)]
    pub summary_id: Option<Uuid>,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardPatch {
    pub front: Option<String>,
    pub back: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// A flashcard as returned by the model, before it is bound to a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardDraft {
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
}

impl FlashcardDraft {
    pub fn into_new(self, subject_id: Uuid, summary_id: Option<Uuid>) -> NewFlashcard {
        NewFlashcard {
            subject_id,
            summary_id,
            front: self.front,
            back: self.back,
            difficulty: self.difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub subject_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn new(input: NewQuestion) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: input.subject_id,
            summary_id: input.summary_id,
            question_type: input.question_type,
            question: input.question,
            options: input.options,
            answer: input.answer,
            explanation: input.explanation,
            difficulty: input.difficulty,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub subject_id: Uuid,
    #[serde(default)]
    pub summary_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// A question as returned by the model, before it is bound to a subject.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub question_type: QuestionType,
    pub question: String,
    pub options: Option<Vec<String>>,
    pub answer: String,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
}

impl QuestionDraft {
    pub fn into_new(self, subject_id: Uuid, summary_id: Option<Uuid>) -> NewQuestion {
        NewQuestion {
            subject_id,
            summary_id,
            question_type: self.question_type,
            question: self.question,
            options: self.options,
            answer: self.answer,
            explanation: self.explanation,
            difficulty: self.difficulty,
        }
    }
}

//=========================================================================================
// Study Plans
//=========================================================================================

/// One scheduled block of study inside a plan. Tasks have no identity outside
/// their owning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyTask {
    pub id: Uuid,
    pub topic: String,
    pub subject: String,
    /// Minutes.
    pub duration: u32,
    pub priority: Priority,
    pub completed: bool,
    /// `YYYY-MM-DD`. Compared as a string, so the format must stay sortable.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
}

impl StudyTask {
    pub fn apply(&mut self, patch: StudyTaskPatch) {
        if let Some(topic) = patch.topic {
            self.topic = topic;
        }
        if let Some(subject) = patch.subject {
            self.subject = subject;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time_slot) = patch.time_slot {
            self.time_slot = Some(time_slot);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyTaskPatch {
    pub topic: Option<String>,
    pub subject: Option<String>,
    pub duration: Option<u32>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub tasks: Vec<StudyTask>,
    pub created_at: DateTime<Utc>,
}

impl StudyPlan {
    pub fn new(input: NewStudyPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            tasks: input.tasks,
            created_at: Utc::now(),
        }
    }

    /// Applies `patch` to the task with `task_id`, returning the updated task.
    pub fn update_task(&mut self, task_id: Uuid, patch: StudyTaskPatch) -> Option<&StudyTask> {
        let task = self.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.apply(patch);
        Some(&*task)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudyPlan {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub tasks: Vec<StudyTask>,
}

//=========================================================================================
// Dashboard & Chat
//=========================================================================================

/// An incomplete task due today or later, tagged with its plan.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingTask {
    pub plan_id: Uuid,
    pub plan_title: String,
    #[serde(flatten)]
    pub task: StudyTask,
}

/// Computed on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_subjects: i64,
    pub total_notes: i64,
    pub total_summaries: i64,
    pub total_flashcards: i64,
    pub total_questions: i64,
    pub recent_summaries: Vec<Summary>,
    pub upcoming_tasks: Vec<UpcomingTask>,
    /// Not tracked yet; always 0.
    pub study_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}
