//! Planner error taxonomy.

use crate::api::{CourseId, SemesterLabel};
use crate::db::repository::RepositoryError;

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Failures of the planning operations.
///
/// Validation failures carry enough detail for the caller to act on them
/// (which prerequisites are missing, how far over a cap the add would go).
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    /// Soft block: retry with an explicit bypass to override.
    #[error("{course} has unmet prerequisites: {}", join_ids(.missing))]
    PrerequisiteUnmet {
        course: CourseId,
        missing: Vec<CourseId>,
    },

    #[error("Adding {adding} credits to {semester} would exceed the {limit}-credit limit (currently {current})")]
    CreditLimitExceeded {
        semester: SemesterLabel,
        current: u32,
        adding: u32,
        limit: u32,
    },

    #[error("{semester} already holds {count} courses (limit {limit})")]
    CourseCountExceeded {
        semester: SemesterLabel,
        count: usize,
        limit: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

fn join_ids(ids: &[CourseId]) -> String {
    ids.iter()
        .map(CourseId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl PlannerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Missing prerequisite ids, for `PrerequisiteUnmet`.
    pub fn missing_prerequisites(&self) -> Option<&[CourseId]> {
        match self {
            Self::PrerequisiteUnmet { missing, .. } => Some(missing),
            _ => None,
        }
    }

    /// Lift store errors that carry planner meaning (absent rows, unique-key
    /// races) into their planner variants.
    pub fn from_store(err: RepositoryError, entity: &'static str, id: impl ToString) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::not_found(entity, id),
            RepositoryError::Conflict { message, .. } => Self::Conflict(message),
            RepositoryError::ValidationError { message, .. } => Self::InvalidInput(message),
            other => Self::Store(other),
        }
    }
}
