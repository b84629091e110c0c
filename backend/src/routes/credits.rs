use serde::{Deserialize, Serialize};

use crate::api::{PlanId, SemesterLabel, StudentId};

/// Credit total for one semester of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterCredits {
    pub plan_id: PlanId,
    pub semester: SemesterLabel,
    pub credits: u32,
}

/// Per-semester line of a plan breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterSummary {
    pub semester: SemesterLabel,
    pub credits: u32,
    pub course_count: usize,
}

/// Planned credits across every plan a student owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCredits {
    pub net_id: StudentId,
    pub name: String,
    pub total_planned_credits: u32,
}

/// Route function name constants
pub const GET_SEMESTER_CREDITS: &str = "get_semester_credits";
pub const GET_SEMESTER_BREAKDOWN: &str = "get_semester_breakdown";
pub const GET_TOTAL_CREDITS: &str = "get_total_credits";
