//! services/api/src/adapters/db.rs
//!
//! This module contains the PostgreSQL storage adapter, one of the two concrete
//! implementations of the `StorageService` port from the `core` crate. It handles
//! all interactions with the database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use studyspark_core::dashboard;
use studyspark_core::domain::{
    DashboardStats, Definition, Flashcard, FlashcardPatch, NewFlashcard, NewNote, NewQuestion,
    NewStudyPlan, NewSubject, NewSummary, Note, Question, StudyPlan, StudyTask, StudyTaskPatch,
    Subject, SubjectCounter, SubjectPatch, Summary,
};
use studyspark_core::ports::{PortError, PortResult, StorageService};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StorageService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Reads the subject, then writes the adjusted counter back, floored at zero.
    /// The two statements are not atomic with each other.
    async fn adjust_counter(
        &self,
        subject_id: Uuid,
        counter: SubjectCounter,
        delta: i32,
    ) -> PortResult<()> {
        let Some(subject) = self.get_subject(subject_id).await? else {
            return Ok(());
        };
        let next = (counter.read(&subject) + delta).max(0);

        let sql = format!("UPDATE subjects SET {} = $1 WHERE id = $2", counter.column());
        sqlx::query(&sql)
            .bind(next)
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    /// Adds each subject's batch size to its counter, one statement per subject.
    async fn add_batch_counts(
        tx: &mut Transaction<'_, Postgres>,
        counter: SubjectCounter,
        subject_ids: impl Iterator<Item = Uuid>,
    ) -> PortResult<()> {
        let mut per_subject: HashMap<Uuid, i32> = HashMap::new();
        for id in subject_ids {
            *per_subject.entry(id).or_default() += 1;
        }

        let sql = format!(
            "UPDATE subjects SET {col} = {col} + $1 WHERE id = $2",
            col = counter.column()
        );
        for (subject_id, added) in per_subject {
            sqlx::query(&sql)
                .bind(added)
                .bind(subject_id)
                .execute(&mut **tx)
                .await
                .map_err(storage_err)?;
        }
        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

fn decode_err(e: impl std::fmt::Display) -> PortError {
    PortError::Storage(format!("Corrupt row: {}", e))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const SUBJECT_COLUMNS: &str =
    "id, name, icon, color, notes_count, flashcards_count, questions_count, last_accessed";
const NOTE_COLUMNS: &str = "id, subject_id, title, content, file_type, file_name, created_at";
const SUMMARY_COLUMNS: &str = "id, note_id, subject_id, title, key_points, definitions, formulas, main_concepts, full_summary, created_at";
const FLASHCARD_COLUMNS: &str = "id, subject_id, summary_id, front, back, difficulty, last_reviewed, times_reviewed, created_at";
const QUESTION_COLUMNS: &str = "id, subject_id, summary_id, question_type, question, options, answer, explanation, difficulty, created_at";
const PLAN_COLUMNS: &str = "id, title, description, start_date, end_date, tasks, created_at";

#[derive(FromRow)]
struct SubjectRecord {
    id: Uuid,
    name: String,
    icon: String,
    color: String,
    notes_count: i32,
    flashcards_count: i32,
    questions_count: i32,
    last_accessed: DateTime<Utc>,
}
impl SubjectRecord {
    fn to_domain(self) -> Subject {
        Subject {
            id: self.id,
            name: self.name,
            icon: self.icon,
            color: self.color,
            notes_count: self.notes_count,
            flashcards_count: self.flashcards_count,
            questions_count: self.questions_count,
            last_accessed: self.last_accessed,
        }
    }
}

#[derive(FromRow)]
struct NoteRecord {
    id: Uuid,
    subject_id: Uuid,
    title: String,
    content: String,
    file_type: String,
    file_name: Option<String>,
    created_at: DateTime<Utc>,
}
impl NoteRecord {
    fn to_domain(self) -> Note {
        Note {
            id: self.id,
            subject_id: self.subject_id,
            title: self.title,
            content: self.content,
            file_type: self.file_type,
            file_name: self.file_name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    note_id: Uuid,
    subject_id: Uuid,
    title: String,
    key_points: Json<Vec<String>>,
    definitions: Json<Vec<Definition>>,
    formulas: Json<Vec<String>>,
    main_concepts: Json<Vec<String>>,
    full_summary: String,
    created_at: DateTime<Utc>,
}
impl SummaryRecord {
    fn to_domain(self) -> Summary {
        Summary {
            id: self.id,
            note_id: self.note_id,
            subject_id: self.subject_id,
            title: self.title,
            key_points: self.key_points.0,
            definitions: self.definitions.0,
            formulas: self.formulas.0,
            main_concepts: self.main_concepts.0,
            full_summary: self.full_summary,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct FlashcardRecord {
    id: Uuid,
    subject_id: Uuid,
    summary_id: Option<Uuid>,
    front: String,
    back: String,
    difficulty: String,
    last_reviewed: Option<DateTime<Utc>>,
    times_reviewed: i32,
    created_at: DateTime<Utc>,
}
impl FlashcardRecord {
    fn to_domain(self) -> PortResult<Flashcard> {
        Ok(Flashcard {
            id: self.id,
            subject_id: self.subject_id,
            summary_id: self.summary_id,
            front: self.front,
            back: self.back,
            difficulty: self.difficulty.parse().map_err(decode_err)?,
            last_reviewed: self.last_reviewed,
            times_reviewed: self.times_reviewed,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct QuestionRecord {
    id: Uuid,
    subject_id: Uuid,
    summary_id: Option<Uuid>,
    question_type: String,
    question: String,
    options: Option<Json<Vec<String>>>,
    answer: String,
    explanation: Option<String>,
    difficulty: String,
    created_at: DateTime<Utc>,
}
impl QuestionRecord {
    fn to_domain(self) -> PortResult<Question> {
        Ok(Question {
            id: self.id,
            subject_id: self.subject_id,
            summary_id: self.summary_id,
            question_type: self.question_type.parse().map_err(decode_err)?,
            question: self.question,
            options: self.options.map(|o| o.0),
            answer: self.answer,
            explanation: self.explanation,
            difficulty: self.difficulty.parse().map_err(decode_err)?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct StudyPlanRecord {
    id: Uuid,
    title: String,
    description: String,
    start_date: String,
    end_date: String,
    tasks: Json<Vec<StudyTask>>,
    created_at: DateTime<Utc>,
}
impl StudyPlanRecord {
    fn to_domain(self) -> StudyPlan {
        StudyPlan {
            id: self.id,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            tasks: self.tasks.0,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// Insert Helpers
//=========================================================================================

async fn insert_flashcard(
    tx: &mut Transaction<'_, Postgres>,
    card: &Flashcard,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO flashcards (id, subject_id, summary_id, front, back, difficulty, last_reviewed, times_reviewed, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(card.id)
    .bind(card.subject_id)
    .bind(card.summary_id)
    .bind(&card.front)
    .bind(&card.back)
    .bind(card.difficulty.as_str())
    .bind(card.last_reviewed)
    .bind(card.times_reviewed)
    .bind(card.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_question(
    tx: &mut Transaction<'_, Postgres>,
    question: &Question,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO questions (id, subject_id, summary_id, question_type, question, options, answer, explanation, difficulty, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(question.id)
    .bind(question.subject_id)
    .bind(question.summary_id)
    .bind(question.question_type.as_str())
    .bind(&question.question)
    .bind(question.options.as_ref().map(Json))
    .bind(&question.answer)
    .bind(&question.explanation)
    .bind(question.difficulty.as_str())
    .bind(question.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

//=========================================================================================
// `StorageService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StorageService for DbAdapter {
    // --- Subjects ---

    async fn get_subjects(&self) -> PortResult<Vec<Subject>> {
        let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY name ASC");
        let records = sqlx::query_as::<_, SubjectRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_subject(&self, id: Uuid) -> PortResult<Option<Subject>> {
        let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1");
        let record = sqlx::query_as::<_, SubjectRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_subject(&self, input: NewSubject) -> PortResult<Subject> {
        let subject = Subject::new(input);
        sqlx::query(
            "INSERT INTO subjects (id, name, icon, color, notes_count, flashcards_count, questions_count, last_accessed) \
             VALUES ($1, $2, $3, $4, 0, 0, 0, $5)",
        )
        .bind(subject.id)
        .bind(&subject.name)
        .bind(&subject.icon)
        .bind(&subject.color)
        .bind(subject.last_accessed)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(subject)
    }

    async fn update_subject(&self, id: Uuid, patch: SubjectPatch) -> PortResult<Option<Subject>> {
        let Some(mut subject) = self.get_subject(id).await? else {
            return Ok(None);
        };
        subject.apply(patch);

        sqlx::query(
            "UPDATE subjects SET name = $1, icon = $2, color = $3, last_accessed = $4 WHERE id = $5",
        )
        .bind(&subject.name)
        .bind(&subject.icon)
        .bind(&subject.color)
        .bind(subject.last_accessed)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(Some(subject))
    }

    async fn delete_subject(&self, id: Uuid) -> PortResult<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        // Children first: every child table references the subject.
        for table in ["flashcards", "questions", "summaries", "notes"] {
            let sql = format!("DELETE FROM {table} WHERE subject_id = $1");
            let removed = sqlx::query(&sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
            debug!("Cascade removed {} rows from {}", removed.rows_affected(), table);
        }

        let deleted = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;

        Ok(deleted.rows_affected() > 0)
    }

    // --- Notes ---

    async fn get_notes(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Note>> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE ($1::uuid IS NULL OR subject_id = $1) ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, NoteRecord>(&sql)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_note(&self, id: Uuid) -> PortResult<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
        let record = sqlx::query_as::<_, NoteRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_note(&self, input: NewNote) -> PortResult<Note> {
        let note = Note::new(input);
        sqlx::query(
            "INSERT INTO notes (id, subject_id, title, content, file_type, file_name, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(note.id)
        .bind(note.subject_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.file_type)
        .bind(&note.file_name)
        .bind(note.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        self.adjust_counter(note.subject_id, SubjectCounter::Notes, 1)
            .await?;
        Ok(note)
    }

    async fn delete_note(&self, id: Uuid) -> PortResult<bool> {
        let subject_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM notes WHERE id = $1 RETURNING subject_id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match subject_id {
            Some(subject_id) => {
                self.adjust_counter(subject_id, SubjectCounter::Notes, -1)
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Summaries ---

    async fn get_summaries(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Summary>> {
        let sql = format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries WHERE ($1::uuid IS NULL OR subject_id = $1) ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, SummaryRecord>(&sql)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_summary(&self, id: Uuid) -> PortResult<Option<Summary>> {
        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM summaries WHERE id = $1");
        let record = sqlx::query_as::<_, SummaryRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_summary(&self, input: NewSummary) -> PortResult<Summary> {
        let summary = Summary::new(input);
        sqlx::query(
            "INSERT INTO summaries (id, note_id, subject_id, title, key_points, definitions, formulas, main_concepts, full_summary, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(summary.id)
        .bind(summary.note_id)
        .bind(summary.subject_id)
        .bind(&summary.title)
        .bind(Json(&summary.key_points))
        .bind(Json(&summary.definitions))
        .bind(Json(&summary.formulas))
        .bind(Json(&summary.main_concepts))
        .bind(&summary.full_summary)
        .bind(summary.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(summary)
    }

    async fn delete_summary(&self, id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM summaries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    // --- Flashcards ---

    async fn get_flashcards(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Flashcard>> {
        let sql = format!(
            "SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE ($1::uuid IS NULL OR subject_id = $1) ORDER BY created_at ASC"
        );
        let records = sqlx::query_as::<_, FlashcardRecord>(&sql)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_flashcard(&self, id: Uuid) -> PortResult<Option<Flashcard>> {
        let sql = format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = $1");
        let record = sqlx::query_as::<_, FlashcardRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn create_flashcard(&self, input: NewFlashcard) -> PortResult<Flashcard> {
        let card = Flashcard::new(input);
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        insert_flashcard(&mut tx, &card).await.map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;

        self.adjust_counter(card.subject_id, SubjectCounter::Flashcards, 1)
            .await?;
        Ok(card)
    }

    async fn create_flashcards(&self, inputs: Vec<NewFlashcard>) -> PortResult<Vec<Flashcard>> {
        let cards: Vec<Flashcard> = inputs.into_iter().map(Flashcard::new).collect();
        if cards.is_empty() {
            return Ok(cards);
        }

        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        for card in &cards {
            insert_flashcard(&mut tx, card).await.map_err(storage_err)?;
        }
        Self::add_batch_counts(
            &mut tx,
            SubjectCounter::Flashcards,
            cards.iter().map(|c| c.subject_id),
        )
        .await?;
        tx.commit().await.map_err(storage_err)?;

        Ok(cards)
    }

    async fn update_flashcard(
        &self,
        id: Uuid,
        patch: FlashcardPatch,
    ) -> PortResult<Option<Flashcard>> {
        let Some(mut card) = self.get_flashcard(id).await? else {
            return Ok(None);
        };
        card.apply(patch);

        sqlx::query(
            "UPDATE flashcards SET front = $1, back = $2, difficulty = $3, last_reviewed = $4, times_reviewed = $5 WHERE id = $6",
        )
        .bind(&card.front)
        .bind(&card.back)
        .bind(card.difficulty.as_str())
        .bind(card.last_reviewed)
        .bind(card.times_reviewed)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(Some(card))
    }

    async fn delete_flashcard(&self, id: Uuid) -> PortResult<bool> {
        let subject_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM flashcards WHERE id = $1 RETURNING subject_id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match subject_id {
            Some(subject_id) => {
                self.adjust_counter(subject_id, SubjectCounter::Flashcards, -1)
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Questions ---

    async fn get_questions(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Question>> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE ($1::uuid IS NULL OR subject_id = $1) ORDER BY created_at ASC"
        );
        let records = sqlx::query_as::<_, QuestionRecord>(&sql)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_question(&self, id: Uuid) -> PortResult<Option<Question>> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");
        let record = sqlx::query_as::<_, QuestionRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn create_question(&self, input: NewQuestion) -> PortResult<Question> {
        let question = Question::new(input);
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        insert_question(&mut tx, &question)
            .await
            .map_err(storage_err)?;
        tx.commit().await.map_err(storage_err)?;

        self.adjust_counter(question.subject_id, SubjectCounter::Questions, 1)
            .await?;
        Ok(question)
    }

    async fn create_questions(&self, inputs: Vec<NewQuestion>) -> PortResult<Vec<Question>> {
        let questions: Vec<Question> = inputs.into_iter().map(Question::new).collect();
        if questions.is_empty() {
            return Ok(questions);
        }

        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        for question in &questions {
            insert_question(&mut tx, question)
                .await
                .map_err(storage_err)?;
        }
        Self::add_batch_counts(
            &mut tx,
            SubjectCounter::Questions,
            questions.iter().map(|q| q.subject_id),
        )
        .await?;
        tx.commit().await.map_err(storage_err)?;

        Ok(questions)
    }

    async fn delete_question(&self, id: Uuid) -> PortResult<bool> {
        let subject_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM questions WHERE id = $1 RETURNING subject_id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match subject_id {
            Some(subject_id) => {
                self.adjust_counter(subject_id, SubjectCounter::Questions, -1)
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Study Plans ---

    async fn get_study_plans(&self) -> PortResult<Vec<StudyPlan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM study_plans ORDER BY created_at DESC");
        let records = sqlx::query_as::<_, StudyPlanRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_study_plan(&self, id: Uuid) -> PortResult<Option<StudyPlan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM study_plans WHERE id = $1");
        let record = sqlx::query_as::<_, StudyPlanRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_study_plan(&self, input: NewStudyPlan) -> PortResult<StudyPlan> {
        let plan = StudyPlan::new(input);
        sqlx::query(
            "INSERT INTO study_plans (id, title, description, start_date, end_date, tasks, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(plan.id)
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(&plan.start_date)
        .bind(&plan.end_date)
        .bind(Json(&plan.tasks))
        .bind(plan.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(plan)
    }

    async fn update_study_task(
        &self,
        plan_id: Uuid,
        task_id: Uuid,
        patch: StudyTaskPatch,
    ) -> PortResult<Option<StudyTask>> {
        let Some(mut plan) = self.get_study_plan(plan_id).await? else {
            return Ok(None);
        };
        let Some(task) = plan.update_task(task_id, patch).cloned() else {
            return Ok(None);
        };

        sqlx::query("UPDATE study_plans SET tasks = $1 WHERE id = $2")
            .bind(Json(&plan.tasks))
            .bind(plan_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(Some(task))
    }

    async fn delete_study_plan(&self, id: Uuid) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM study_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    // --- Dashboard ---

    async fn get_dashboard_stats(&self, today: &str) -> PortResult<DashboardStats> {
        let mut totals = [0i64; 5];
        let tables = ["subjects", "notes", "summaries", "flashcards", "questions"];
        for (total, table) in totals.iter_mut().zip(tables) {
            *total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&self.pool)
                .await
                .map_err(storage_err)?;
        }

        let sql = format!(
            "SELECT {SUMMARY_COLUMNS} FROM summaries ORDER BY created_at DESC LIMIT {}",
            dashboard::DASHBOARD_LIMIT
        );
        let recent_summaries = sqlx::query_as::<_, SummaryRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?
            .into_iter()
            .map(|r| r.to_domain())
            .collect();

        let plans = self.get_study_plans().await?;
        let [total_subjects, total_notes, total_summaries, total_flashcards, total_questions] =
            totals;

        Ok(DashboardStats {
            total_subjects,
            total_notes,
            total_summaries,
            total_flashcards,
            total_questions,
            recent_summaries,
            upcoming_tasks: dashboard::upcoming_tasks(&plans, today),
            study_streak: 0,
        })
    }
}
