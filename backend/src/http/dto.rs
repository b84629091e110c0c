//! Request and response bodies for the HTTP API.
//!
//! Most response types come straight from [`crate::api`]; only the shapes
//! that exist purely for HTTP live here.

use serde::{Deserialize, Serialize};

use crate::api::{CourseId, MajorId, SemesterLabel, StudentId};
use crate::services::AddCourseRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub net_id: StudentId,
    pub name: String,
    pub major_id: MajorId,
    #[serde(default)]
    pub expected_graduation: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    pub net_id: StudentId,
}

/// Body of `POST /v1/plans/{plan_id}/courses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCourseBody {
    pub course_id: CourseId,
    pub semester: SemesterLabel,
    #[serde(default)]
    pub bypass_prerequisites: bool,
    #[serde(default)]
    pub bypass_reason: Option<String>,
}

impl From<AddCourseBody> for AddCourseRequest {
    fn from(body: AddCourseBody) -> Self {
        let request = AddCourseRequest::new(body.course_id, body.semester);
        if body.bypass_prerequisites {
            request.with_bypass(body.bypass_reason)
        } else {
            request
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApMappingQuery {
    pub course_name: String,
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_course_body_defaults_to_no_bypass() {
        let body: AddCourseBody =
            serde_json::from_str(r#"{"course_id": " cs225", "semester": "fa24"}"#).unwrap();
        let request = AddCourseRequest::from(body);
        assert_eq!(request.course_id.as_str(), "CS225");
        assert_eq!(request.semester.as_str(), "FA24");
        assert!(!request.bypass_prerequisites);
        assert!(request.bypass_reason.is_none());
    }

    #[test]
    fn test_reason_ignored_without_bypass_flag() {
        let body: AddCourseBody = serde_json::from_str(
            r#"{"course_id": "CS225", "semester": "FA24", "bypass_reason": "advisor ok"}"#,
        )
        .unwrap();
        let request = AddCourseRequest::from(body);
        assert!(!request.bypass_prerequisites);
        assert!(request.bypass_reason.is_none());
    }
}
