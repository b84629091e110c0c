//! Public API surface for the planner backend.
//!
//! This file consolidates the identifier types and the DTOs exposed through the
//! HTTP API. All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::catalog::ApCourseMapping;
pub use crate::routes::credits::{SemesterCredits, SemesterSummary, TotalCredits};
pub use crate::routes::graph::{GraphEdge, GraphNode, PrerequisiteGraph};
pub use crate::routes::plans::{AddCourseOutcome, PlanCourses};
pub use crate::routes::requirements::{RequirementProgress, RequirementStatus};

pub use crate::models::{
    AcademicPlan, ApCredit, BypassLogEntry, Course, PlannedCourse, PlannedCourseDetail,
    Prerequisite, Requirement, Student,
};

use serde::{Deserialize, Serialize};

/// Student identifier (campus net id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct StudentId(String);

/// Academic plan identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlanId(pub i64);

/// Catalog course identifier.
///
/// Course ids are compared case-insensitively everywhere, so the value is
/// stored trimmed and upper-cased. `"cs 225 "` and `"CS 225"` are the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CourseId(String);

/// Major identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MajorId(String);

/// Semester label such as `FA24` or `SPRING 2025`.
///
/// Labels are matched case-insensitively; the stored form is trimmed and
/// upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SemesterLabel(String);

impl StudentId {
    pub fn new(value: impl Into<String>) -> Self {
        StudentId(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PlanId {
    pub fn new(value: i64) -> Self {
        PlanId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl CourseId {
    pub fn new(value: impl AsRef<str>) -> Self {
        CourseId(value.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl MajorId {
    pub fn new(value: impl Into<String>) -> Self {
        MajorId(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SemesterLabel {
    pub fn new(value: impl AsRef<str>) -> Self {
        SemesterLabel(value.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison against a raw label from storage or input.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for MajorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SemesterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for StudentId {
    fn from(value: String) -> Self {
        StudentId::new(value)
    }
}
impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        StudentId::new(value)
    }
}
impl From<StudentId> for String {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

impl From<String> for CourseId {
    fn from(value: String) -> Self {
        CourseId::new(value)
    }
}
impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        CourseId::new(value)
    }
}
impl From<CourseId> for String {
    fn from(id: CourseId) -> Self {
        id.0
    }
}

impl From<String> for MajorId {
    fn from(value: String) -> Self {
        MajorId::new(value)
    }
}
impl From<&str> for MajorId {
    fn from(value: &str) -> Self {
        MajorId::new(value)
    }
}
impl From<MajorId> for String {
    fn from(id: MajorId) -> Self {
        id.0
    }
}

impl From<String> for SemesterLabel {
    fn from(value: String) -> Self {
        SemesterLabel::new(value)
    }
}
impl From<&str> for SemesterLabel {
    fn from(value: &str) -> Self {
        SemesterLabel::new(value)
    }
}
impl From<SemesterLabel> for String {
    fn from(label: SemesterLabel) -> Self {
        label.0
    }
}

impl From<PlanId> for i64 {
    fn from(id: PlanId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_id_normalizes_case_and_whitespace() {
        assert_eq!(CourseId::new("  cs225 "), CourseId::new("CS225"));
        assert_eq!(CourseId::new("cs225").as_str(), "CS225");
    }

    #[test]
    fn test_course_id_deserializes_normalized() {
        let id: CourseId = serde_json::from_str("\"math241\"").unwrap();
        assert_eq!(id.as_str(), "MATH241");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"MATH241\"");
    }

    #[test]
    fn test_semester_label_matches_ignoring_case() {
        let label = SemesterLabel::new("fa24");
        assert_eq!(label.as_str(), "FA24");
        assert!(label.matches("Fa24"));
        assert!(label.matches(" FA24 "));
        assert!(!label.matches("SP25"));
    }

    #[test]
    fn test_student_id_keeps_case() {
        let id = StudentId::new(" jdoe2 ");
        assert_eq!(id.as_str(), "jdoe2");
        assert!(!id.is_empty());
    }

    #[test]
    fn test_plan_id_display() {
        assert_eq!(PlanId::new(7).to_string(), "7");
        assert_eq!(i64::from(PlanId::new(7)), 7);
    }
}
