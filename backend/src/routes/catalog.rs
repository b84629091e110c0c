use serde::{Deserialize, Serialize};

use crate::api::CourseId;

/// AP exam → catalog course mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApCourseMapping {
    pub course_name: String,
    pub score: i32,
    pub course_id: CourseId,
}

/// Maximum number of rows returned by a course search.
pub const SEARCH_LIMIT: usize = 50;

/// Route function name constants
pub const LIST_COURSES: &str = "list_courses";
pub const SEARCH_COURSES: &str = "search_courses";
pub const GET_PREREQUISITES: &str = "get_prerequisites";
pub const LIST_MAJORS: &str = "list_majors";
pub const LIST_AP_COURSES: &str = "list_ap_courses";
pub const GET_AP_COURSE_MAPPING: &str = "get_ap_course_mapping";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_limit() {
        assert_eq!(SEARCH_LIMIT, 50);
    }

    #[test]
    fn test_mapping_serialization() {
        let mapping = ApCourseMapping {
            course_name: "Calculus BC".to_string(),
            score: 5,
            course_id: CourseId::new("MATH231"),
        };
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["course_id"], "MATH231");
        assert_eq!(json["score"], 5);
    }
}
