//! crates/studyspark_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The API layer only ever talks to storage and to the language model through
//! these two traits; the concrete backends are picked once at startup.

use async_trait::async_trait;
use uuid::Uuid;

use crate::dashboard;
use crate::domain::{
    ChatTurn, DashboardStats, Flashcard, FlashcardDraft, FlashcardPatch, NewFlashcard, NewNote,
    NewQuestion, NewStudyPlan, NewSubject, NewSummary, Note, Question, QuestionDraft,
    QuestionType, StudyPlan, StudyTask, StudyTaskPatch, Subject, SubjectPatch, Summary,
    SummaryContent,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Absent records are not errors: lookups return `Ok(None)` and the caller decides
/// what a miss means.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("AI provider error: {0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Port
//=========================================================================================

/// CRUD over every entity family, plus the denormalized subject counters and the
/// dashboard projection.
///
/// Creating or deleting a note, flashcard or question also adjusts the owning
/// subject's counter. That adjustment is a separate read-then-write step, not part
/// of the same atomic operation as the insert or delete.
#[async_trait]
pub trait StorageService: Send + Sync {
    // --- Subjects ---
    async fn get_subjects(&self) -> PortResult<Vec<Subject>>;

    async fn get_subject(&self, id: Uuid) -> PortResult<Option<Subject>>;

    async fn create_subject(&self, input: NewSubject) -> PortResult<Subject>;

    async fn update_subject(&self, id: Uuid, patch: SubjectPatch) -> PortResult<Option<Subject>>;

    /// Deletes the subject and every note, summary, flashcard and question under it.
    async fn delete_subject(&self, id: Uuid) -> PortResult<bool>;

    // --- Notes ---
    async fn get_notes(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Note>>;

    async fn get_note(&self, id: Uuid) -> PortResult<Option<Note>>;

    async fn create_note(&self, input: NewNote) -> PortResult<Note>;

    async fn delete_note(&self, id: Uuid) -> PortResult<bool>;

    // --- Summaries ---
    /// Newest first.
    async fn get_summaries(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Summary>>;

    async fn get_summary(&self, id: Uuid) -> PortResult<Option<Summary>>;

    async fn create_summary(&self, input: NewSummary) -> PortResult<Summary>;

    async fn delete_summary(&self, id: Uuid) -> PortResult<bool>;

    // --- Flashcards ---
    async fn get_flashcards(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Flashcard>>;

    async fn get_flashcard(&self, id: Uuid) -> PortResult<Option<Flashcard>>;

    async fn create_flashcard(&self, input: NewFlashcard) -> PortResult<Flashcard>;

    async fn create_flashcards(&self, inputs: Vec<NewFlashcard>) -> PortResult<Vec<Flashcard>>;

    async fn update_flashcard(
        &self,
        id: Uuid,
        patch: FlashcardPatch,
    ) -> PortResult<Option<Flashcard>>;

    async fn delete_flashcard(&self, id: Uuid) -> PortResult<bool>;

    // --- Questions ---
    async fn get_questions(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Question>>;

    async fn get_question(&self, id: Uuid) -> PortResult<Option<Question>>;

    async fn create_question(&self, input: NewQuestion) -> PortResult<Question>;

    async fn create_questions(&self, inputs: Vec<NewQuestion>) -> PortResult<Vec<Question>>;

    async fn delete_question(&self, id: Uuid) -> PortResult<bool>;

    // --- Study Plans ---
    async fn get_study_plans(&self) -> PortResult<Vec<StudyPlan>>;

    async fn get_study_plan(&self, id: Uuid) -> PortResult<Option<StudyPlan>>;

    async fn create_study_plan(&self, input: NewStudyPlan) -> PortResult<StudyPlan>;

    /// Merges `patch` into one task and writes the whole task list back onto the plan.
    /// `None` when either the plan or the task does not exist.
    async fn update_study_task(
        &self,
        plan_id: Uuid,
        task_id: Uuid,
        patch: StudyTaskPatch,
    ) -> PortResult<Option<StudyTask>>;

    async fn delete_study_plan(&self, id: Uuid) -> PortResult<bool>;

    // --- Dashboard ---
    /// Totals come from full scans of each table; `today` is a `YYYY-MM-DD` string.
    async fn get_dashboard_stats(&self, today: &str) -> PortResult<DashboardStats> {
        let subjects = self.get_subjects().await?;
        let notes = self.get_notes(None).await?;
        let summaries = self.get_summaries(None).await?;
        let flashcards = self.get_flashcards(None).await?;
        let questions = self.get_questions(None).await?;
        let plans = self.get_study_plans().await?;

        Ok(DashboardStats {
            total_subjects: subjects.len() as i64,
            total_notes: notes.len() as i64,
            total_summaries: summaries.len() as i64,
            total_flashcards: flashcards.len() as i64,
            total_questions: questions.len() as i64,
            recent_summaries: dashboard::recent_summaries(summaries),
            upcoming_tasks: dashboard::upcoming_tasks(&plans, today),
            study_streak: 0,
        })
    }
}

//=========================================================================================
// AI Gateway Port
//=========================================================================================

/// Prompt-templating wrappers around a chat-completion model.
///
/// Missing fields inside a reply are filled with defaults; only a failed call or an
/// unreadable reply is an error.
#[async_trait]
pub trait StudyAiService: Send + Sync {
    /// Produces a structured summary of `content`.
    async fn summarize(&self, content: &str, title: &str) -> PortResult<SummaryContent>;

    /// Continues a tutoring conversation and returns the assistant's reply text.
    async fn chat(&self, message: &str, history: &[ChatTurn]) -> PortResult<String>;

    /// At most `generation::MAX_FLASHCARDS` cards, whatever `count` asks for.
    async fn generate_flashcards(
        &self,
        content: &str,
        count: usize,
    ) -> PortResult<Vec<FlashcardDraft>>;

    /// At most `generation::MAX_QUESTIONS` questions, whatever `count` asks for.
    async fn generate_questions(
        &self,
        content: &str,
        types: &[QuestionType],
        count: usize,
    ) -> PortResult<Vec<QuestionDraft>>;

    /// Builds a dated plan. An empty `subjects` list lets the model name subjects itself.
    async fn generate_study_plan(
        &self,
        prompt: &str,
        subjects: &[String],
    ) -> PortResult<NewStudyPlan>;
}
