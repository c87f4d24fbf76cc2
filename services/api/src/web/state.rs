//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every request handler.

use crate::config::Config;
use std::sync::Arc;
use studyspark_core::ports::{StorageService, StudyAiService};

/// The shared application state, created once at startup and passed to all handlers.
///
/// The storage backend is chosen when the state is built and never changes afterwards.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub ai: Arc<dyn StudyAiService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn StorageService>,
        ai: Arc<dyn StudyAiService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            storage,
            ai,
            config,
        }
    }
}
