//! Student-owned planning records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{CourseId, MajorId, PlanId, SemesterLabel, StudentId};

/// A registered student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub net_id: StudentId,
    pub name: String,
    pub major_id: MajorId,
    /// Expected graduation in years of study (e.g. `4.0`).
    #[serde(default)]
    pub expected_graduation: Option<f64>,
}

/// Partial profile update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub major_id: Option<MajorId>,
    #[serde(default)]
    pub expected_graduation: Option<f64>,
}

impl Student {
    pub fn apply(&mut self, update: StudentProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(major_id) = update.major_id {
            self.major_id = major_id;
        }
        if let Some(expected_graduation) = update.expected_graduation {
            self.expected_graduation = Some(expected_graduation);
        }
    }
}

/// A multi-semester plan owned by exactly one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPlan {
    pub plan_id: PlanId,
    pub net_id: StudentId,
    pub creation_date: NaiveDate,
}

/// A course placed into a plan. Unique per (plan, course).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCourse {
    pub plan_id: PlanId,
    pub course_id: CourseId,
    pub semester: SemesterLabel,
}

/// A planned course joined with its catalog credit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCourseDetail {
    pub plan_id: PlanId,
    pub course_id: CourseId,
    pub semester: SemesterLabel,
    pub credits: u32,
}

/// Audit record written when a course is added despite unmet prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BypassLogEntry {
    pub entry_id: Uuid,
    pub net_id: StudentId,
    pub course_id: CourseId,
    pub plan_id: PlanId,
    pub reason: String,
    pub missing_prerequisites: Vec<CourseId>,
    pub logged_at: DateTime<Utc>,
}

impl BypassLogEntry {
    pub fn new(
        net_id: StudentId,
        course_id: CourseId,
        plan_id: PlanId,
        reason: impl Into<String>,
        missing_prerequisites: Vec<CourseId>,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            net_id,
            course_id,
            plan_id,
            reason: reason.into(),
            missing_prerequisites,
            logged_at: Utc::now(),
        }
    }
}
