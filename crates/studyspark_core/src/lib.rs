pub mod dashboard;
pub mod domain;
pub mod generation;
pub mod ports;

pub use domain::{
    ChatRole, ChatTurn, DashboardStats, Definition, Difficulty, Flashcard, FlashcardDraft,
    FlashcardPatch, NewFlashcard, NewNote, NewQuestion, NewStudyPlan, NewSubject, NewSummary,
    Note, Priority, Question, QuestionDraft, QuestionType, StudyPlan, StudyTask, StudyTaskPatch,
    Subject, SubjectCounter, SubjectPatch, Summary, SummaryContent, UpcomingTask,
};
pub use ports::{PortError, PortResult, StorageService, StudyAiService};
