use serde::{Deserialize, Serialize};

use crate::api::{AcademicPlan, CourseId, PlanId, PlannedCourseDetail, SemesterLabel};

/// A plan together with its planned courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCourses {
    pub plan: AcademicPlan,
    pub courses: Vec<PlannedCourseDetail>,
}

/// Result of a successful add-course operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCourseOutcome {
    pub plan_id: PlanId,
    pub course_id: CourseId,
    pub semester: SemesterLabel,
    pub credits: u32,
    /// Semester credit total including the added course.
    pub semester_credits: u32,
    /// Whether unmet prerequisites were overridden (and logged).
    pub bypassed: bool,
}

/// Route function name constants
pub const CREATE_PLAN: &str = "create_plan";
pub const GET_PLAN: &str = "get_plan";
pub const DELETE_PLAN: &str = "delete_plan";
pub const ADD_COURSE: &str = "add_course";
pub const REMOVE_COURSE: &str = "remove_course";
pub const GET_BYPASS_LOG: &str = "get_bypass_log";
