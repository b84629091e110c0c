//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::FullRepository;
use crate::services::PlanMutationGuard;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store handle shared by every request.
    pub repository: Arc<dyn FullRepository>,
    /// Serializes plan mutations and enforces the semester limits.
    pub planner: PlanMutationGuard,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, config: AppConfig) -> Self {
        Self {
            repository,
            planner: PlanMutationGuard::new(config.semester_limits()),
            config: Arc::new(config),
        }
    }
}
