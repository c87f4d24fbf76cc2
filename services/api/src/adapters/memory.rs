//! services/api/src/adapters/memory.rs
//!
//! The in-memory implementation of the `StorageService` port, used whenever no
//! database is configured. State lives only in this process and is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use studyspark_core::domain::{
    Flashcard, FlashcardPatch, NewFlashcard, NewNote, NewQuestion, NewStudyPlan, NewSubject,
    NewSummary, Note, Question, StudyPlan, StudyTask, StudyTaskPatch, Subject, SubjectCounter,
    SubjectPatch, Summary,
};
use studyspark_core::ports::{PortResult, StorageService};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// One map per entity family, keyed by the generated id.
#[derive(Default)]
pub struct MemoryStorage {
    subjects: RwLock<HashMap<Uuid, Subject>>,
    notes: RwLock<HashMap<Uuid, Note>>,
    summaries: RwLock<HashMap<Uuid, Summary>>,
    flashcards: RwLock<HashMap<Uuid, Flashcard>>,
    questions: RwLock<HashMap<Uuid, Question>>,
    study_plans: RwLock<HashMap<Uuid, StudyPlan>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the subject, then writes the adjusted counter back, floored at zero.
    /// The lock is released between the two steps.
    async fn adjust_counter(&self, subject_id: Uuid, counter: SubjectCounter, delta: i32) {
        let current = self.subjects.read().await.get(&subject_id).map(|s| counter.read(s));
        let Some(current) = current else {
            return;
        };
        if let Some(subject) = self.subjects.write().await.get_mut(&subject_id) {
            counter.write(subject, (current + delta).max(0));
        }
    }
}

/// Values matching `keep`, ordered by `key`.
fn collect_sorted<T, K, F, S>(map: &HashMap<Uuid, T>, keep: F, key: S) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> bool,
    S: Fn(&T) -> K,
{
    let mut items: Vec<T> = map.values().filter(|v| keep(v)).cloned().collect();
    items.sort_by_key(|v| key(v));
    items
}

#[async_trait]
impl StorageService for MemoryStorage {
    // --- Subjects ---

    async fn get_subjects(&self) -> PortResult<Vec<Subject>> {
        let subjects = self.subjects.read().await;
        Ok(collect_sorted(&subjects, |_| true, |s| s.name.clone()))
    }

    async fn get_subject(&self, id: Uuid) -> PortResult<Option<Subject>> {
        Ok(self.subjects.read().await.get(&id).cloned())
    }

    async fn create_subject(&self, input: NewSubject) -> PortResult<Subject> {
        let subject = Subject::new(input);
        self.subjects
            .write()
            .await
            .insert(subject.id, subject.clone());
        Ok(subject)
    }

    async fn update_subject(&self, id: Uuid, patch: SubjectPatch) -> PortResult<Option<Subject>> {
        let mut subjects = self.subjects.write().await;
        Ok(subjects.get_mut(&id).map(|subject| {
            subject.apply(patch);
            subject.clone()
        }))
    }

    async fn delete_subject(&self, id: Uuid) -> PortResult<bool> {
        if self.subjects.write().await.remove(&id).is_none() {
            return Ok(false);
        }

        self.notes.write().await.retain(|_, n| n.subject_id != id);
        self.summaries.write().await.retain(|_, s| s.subject_id != id);
        self.flashcards.write().await.retain(|_, f| f.subject_id != id);
        self.questions.write().await.retain(|_, q| q.subject_id != id);
        debug!("Deleted subject {} and its children", id);
        Ok(true)
    }

    // --- Notes ---

    async fn get_notes(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Note>> {
        let notes = self.notes.read().await;
        let mut items = collect_sorted(
            &notes,
            |n| subject_id.map_or(true, |id| n.subject_id == id),
            |n| n.created_at,
        );
        items.reverse();
        Ok(items)
    }

    async fn get_note(&self, id: Uuid) -> PortResult<Option<Note>> {
        Ok(self.notes.read().await.get(&id).cloned())
    }

    async fn create_note(&self, input: NewNote) -> PortResult<Note> {
        let note = Note::new(input);
        self.notes.write().await.insert(note.id, note.clone());
        self.adjust_counter(note.subject_id, SubjectCounter::Notes, 1)
            .await;
        Ok(note)
    }

    async fn delete_note(&self, id: Uuid) -> PortResult<bool> {
        let removed = self.notes.write().await.remove(&id);
        match removed {
            Some(note) => {
                self.adjust_counter(note.subject_id, SubjectCounter::Notes, -1)
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Summaries ---

    async fn get_summaries(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Summary>> {
        let summaries = self.summaries.read().await;
        let mut items = collect_sorted(
            &summaries,
            |s| subject_id.map_or(true, |id| s.subject_id == id),
            |s| s.created_at,
        );
        items.reverse();
        Ok(items)
    }

    async fn get_summary(&self, id: Uuid) -> PortResult<Option<Summary>> {
        Ok(self.summaries.read().await.get(&id).cloned())
    }

    async fn create_summary(&self, input: NewSummary) -> PortResult<Summary> {
        let summary = Summary::new(input);
        self.summaries
            .write()
            .await
            .insert(summary.id, summary.clone());
        Ok(summary)
    }

    async fn delete_summary(&self, id: Uuid) -> PortResult<bool> {
        Ok(self.summaries.write().await.remove(&id).is_some())
    }

    // --- Flashcards ---

    async fn get_flashcards(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Flashcard>> {
        let flashcards = self.flashcards.read().await;
        Ok(collect_sorted(
            &flashcards,
            |f| subject_id.map_or(true, |id| f.subject_id == id),
            |f| f.created_at,
        ))
    }

    async fn get_flashcard(&self, id: Uuid) -> PortResult<Option<Flashcard>> {
        Ok(self.flashcards.read().await.get(&id).cloned())
    }

    async fn create_flashcard(&self, input: NewFlashcard) -> PortResult<Flashcard> {
        let card = Flashcard::new(input);
        self.flashcards.write().await.insert(card.id, card.clone());
        self.adjust_counter(card.subject_id, SubjectCounter::Flashcards, 1)
            .await;
        Ok(card)
    }

    async fn create_flashcards(&self, inputs: Vec<NewFlashcard>) -> PortResult<Vec<Flashcard>> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(self.create_flashcard(input).await?);
        }
        Ok(created)
    }

    async fn update_flashcard(
        &self,
        id: Uuid,
        patch: FlashcardPatch,
    ) -> PortResult<Option<Flashcard>> {
        let mut flashcards = self.flashcards.write().await;
        Ok(flashcards.get_mut(&id).map(|card| {
            card.apply(patch);
            card.clone()
        }))
    }

    async fn delete_flashcard(&self, id: Uuid) -> PortResult<bool> {
        let removed = self.flashcards.write().await.remove(&id);
        match removed {
            Some(card) => {
                self.adjust_counter(card.subject_id, SubjectCounter::Flashcards, -1)
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Questions ---

    async fn get_questions(&self, subject_id: Option<Uuid>) -> PortResult<Vec<Question>> {
        let questions = self.questions.read().await;
        Ok(collect_sorted(
            &questions,
            |q| subject_id.map_or(true, |id| q.subject_id == id),
            |q| q.created_at,
        ))
    }

    async fn get_question(&self, id: Uuid) -> PortResult<Option<Question>> {
        Ok(self.questions.read().await.get(&id).cloned())
    }

    async fn create_question(&self, input: NewQuestion) -> PortResult<Question> {
        let question = Question::new(input);
        self.questions
            .write()
            .await
            .insert(question.id, question.clone());
        self.adjust_counter(question.subject_id, SubjectCounter::Questions, 1)
            .await;
        Ok(question)
    }

    async fn create_questions(&self, inputs: Vec<NewQuestion>) -> PortResult<Vec<Question>> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            created.push(self.create_question(input).await?);
        }
        Ok(created)
    }

    async fn delete_question(&self, id: Uuid) -> PortResult<bool> {
        let removed = self.questions.write().await.remove(&id);
        match removed {
            Some(question) => {
                self.adjust_counter(question.subject_id, SubjectCounter::Questions, -1)
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // --- Study Plans ---

    async fn get_study_plans(&self) -> PortResult<Vec<StudyPlan>> {
        let plans = self.study_plans.read().await;
        let mut items = collect_sorted(&plans, |_| true, |p| p.created_at);
        items.reverse();
        Ok(items)
    }

    async fn get_study_plan(&self, id: Uuid) -> PortResult<Option<StudyPlan>> {
        Ok(self.study_plans.read().await.get(&id).cloned())
    }

    async fn create_study_plan(&self, input: NewStudyPlan) -> PortResult<StudyPlan> {
        let plan = StudyPlan::new(input);
        self.study_plans
            .write()
            .await
            .insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn update_study_task(
        &self,
        plan_id: Uuid,
        task_id: Uuid,
        patch: StudyTaskPatch,
    ) -> PortResult<Option<StudyTask>> {
        let mut plans = self.study_plans.write().await;
        Ok(plans
            .get_mut(&plan_id)
            .and_then(|plan| plan.update_task(task_id, patch).cloned()))
    }

    async fn delete_study_plan(&self, id: Uuid) -> PortResult<bool> {
        Ok(self.study_plans.write().await.remove(&id).is_some())
    }
}
