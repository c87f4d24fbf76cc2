pub mod db;
pub mod memory;
pub mod openai;

pub use db::DbAdapter;
pub use memory::MemoryStorage;
pub use openai::OpenAiStudyAdapter;
