//! Catalog seed file format.
//!
//! A seed is a single JSON document holding the catalog tables:
//!
//! ```json
//! {
//!   "courses": [{"course_id": "CS125", "credits": 4}],
//!   "prerequisites": [{"course_id": "CS225", "prerequisite_id": "CS125"}],
//!   "requirements": [{"major_id": "CS", "course_id": "CS125", "credits": 4}],
//!   "ap_credits": []
//! }
//! ```
//!
//! Column names exported from the legacy database (`CourseID`, `Credits`, ...)
//! are accepted as aliases.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::catalog::{ApCredit, Course, Requirement};
use crate::api::CourseId;

/// Prerequisite edge as it appears in a seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteSeed {
    #[serde(alias = "CourseID")]
    pub course_id: CourseId,
    #[serde(alias = "PrerequisiteID")]
    pub prerequisite_id: CourseId,
}

/// Full catalog seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub prerequisites: Vec<PrerequisiteSeed>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub ap_credits: Vec<ApCredit>,
}

impl CatalogSeed {
    /// Parse a seed from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid catalog seed JSON")
    }

    /// Read and parse a seed file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog seed {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
            && self.prerequisites.is_empty()
            && self.requirements.is_empty()
            && self.ap_credits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snake_case_seed() {
        let seed = CatalogSeed::from_json_str(
            r#"{
                "courses": [{"course_id": "cs125", "credits": 4}],
                "prerequisites": [{"course_id": "CS225", "prerequisite_id": "cs125"}]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.courses.len(), 1);
        assert_eq!(seed.courses[0].course_id.as_str(), "CS125");
        assert_eq!(seed.prerequisites[0].prerequisite_id.as_str(), "CS125");
        assert!(seed.requirements.is_empty());
    }

    #[test]
    fn test_parse_legacy_column_names() {
        let seed = CatalogSeed::from_json_str(
            r#"{
                "courses": [{"CourseID": "MATH241", "Credits": 4}],
                "requirements": [{"MajorID": "CS", "CourseID": "MATH241", "Credits": 4}],
                "ap_credits": [{"NetID": "jdoe2", "CourseName": "Calculus BC", "Score": 5, "CourseID": "MATH231"}]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.courses[0].credits, 4);
        assert_eq!(seed.requirements[0].major_id.as_str(), "CS");
        assert_eq!(
            seed.ap_credits[0].course_id.as_ref().map(|c| c.as_str()),
            Some("MATH231")
        );
    }

    #[test]
    fn test_invalid_seed_is_error() {
        assert!(CatalogSeed::from_json_str("{\"courses\": 5}").is_err());
        assert!(CatalogSeed::default().is_empty());
    }
}
