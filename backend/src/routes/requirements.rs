use serde::{Deserialize, Serialize};

use crate::api::{CourseId, MajorId};

/// One requirement line with its credit weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementStatus {
    pub course_id: CourseId,
    pub credits: u32,
}

/// Requirement progress for a student's declared major.
///
/// Both partitions keep the order of the major's requirement list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementProgress {
    pub major_id: MajorId,
    pub fulfilled: Vec<RequirementStatus>,
    pub unfulfilled: Vec<RequirementStatus>,
}

impl RequirementProgress {
    pub fn fulfilled_credits(&self) -> u32 {
        self.fulfilled.iter().map(|r| r.credits).sum()
    }

    pub fn remaining_credits(&self) -> u32 {
        self.unfulfilled.iter().map(|r| r.credits).sum()
    }
}

/// Route function name constant
pub const GET_FULFILLED_REQUIREMENTS: &str = "get_fulfilled_requirements";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_json_shape() {
        let progress = RequirementProgress {
            major_id: MajorId::new("CS"),
            fulfilled: vec![RequirementStatus {
                course_id: CourseId::new("CS125"),
                credits: 3,
            }],
            unfulfilled: vec![],
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["majorId"], "CS");
        assert_eq!(json["fulfilled"][0]["courseId"], "CS125");
        assert_eq!(json["fulfilled"][0]["credits"], 3);
        assert!(json["unfulfilled"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_credit_totals() {
        let progress = RequirementProgress {
            major_id: MajorId::new("CS"),
            fulfilled: vec![
                RequirementStatus {
                    course_id: CourseId::new("CS125"),
                    credits: 3,
                },
                RequirementStatus {
                    course_id: CourseId::new("CS233"),
                    credits: 3,
                },
            ],
            unfulfilled: vec![RequirementStatus {
                course_id: CourseId::new("CS225"),
                credits: 4,
            }],
        };
        assert_eq!(progress.fulfilled_credits(), 6);
        assert_eq!(progress.remaining_credits(), 4);
    }
}
