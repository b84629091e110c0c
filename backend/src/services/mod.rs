//! Planning rules.
//!
//! - [`prerequisite_graph`]: expands a course's prerequisite chain
//! - [`progress`]: requirement progress and credit totals
//! - [`plan_guard`]: validated add/remove of planned courses
//!
//! Every function takes the store handle explicitly; nothing here holds
//! global state.

pub mod error;
pub mod plan_guard;
pub mod prerequisite_graph;
pub mod progress;

pub use error::{PlannerError, PlannerResult};
pub use plan_guard::{
    missing_prerequisites, AddCourseRequest, PlanLocks, PlanMutationGuard, SemesterLimits,
    DEFAULT_MAX_SEMESTER_COURSES, DEFAULT_MAX_SEMESTER_CREDITS,
};
pub use prerequisite_graph::build_prerequisite_graph;
pub use progress::{
    fulfilled_requirements, semester_breakdown, semester_credits, total_planned_credits,
};
