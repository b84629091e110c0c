//! Catalog records: courses, prerequisite edges, major requirements and AP
//! credit mappings.
//!
//! These are read-only from the planner's point of view. Only administrative
//! processes (catalog seeding) write them.

use serde::{Deserialize, Serialize};

use crate::api::{CourseId, MajorId, StudentId};

/// A course in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(alias = "CourseID")]
    pub course_id: CourseId,
    #[serde(alias = "Credits", default)]
    pub credits: u32,
}

impl Course {
    pub fn new(course_id: impl Into<CourseId>, credits: u32) -> Self {
        Self {
            course_id: course_id.into(),
            credits,
        }
    }
}

/// One prerequisite edge: `course_id` requires `prerequisite_id`.
///
/// `prerequisite_credits` is filled from the catalog when the prerequisite
/// course exists; dangling edges keep `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub course_id: CourseId,
    pub prerequisite_id: CourseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite_credits: Option<u32>,
}

/// A (major, course) pairing that counts toward degree progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(alias = "MajorID")]
    pub major_id: MajorId,
    #[serde(alias = "CourseID")]
    pub course_id: CourseId,
    #[serde(alias = "Credits", default)]
    pub credits: u32,
}

/// AP exam result mapped onto a catalog course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApCredit {
    #[serde(alias = "NetID")]
    pub net_id: StudentId,
    #[serde(alias = "CourseName")]
    pub course_name: String,
    #[serde(alias = "Score")]
    pub score: i32,
    #[serde(alias = "CourseID", default)]
    pub course_id: Option<CourseId>,
}
