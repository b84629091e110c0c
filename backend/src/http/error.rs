//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::CourseId;
use crate::db::repository::RepositoryError;
use crate::services::PlannerError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
    /// Set when an add was refused for unmet prerequisites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_prerequisites: Option<Vec<CourseId>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            missing_prerequisites: None,
        }
    }

    pub fn with_missing(mut self, missing: Vec<CourseId>) -> Self {
        self.missing_prerequisites = Some(missing);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    /// Planner validation refusal (prerequisites, semester caps).
    Rejected {
        code: &'static str,
        message: String,
        missing: Option<Vec<CourseId>>,
    },
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Rejected { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::NotFound(msg) => ApiError::new("NOT_FOUND", msg),
            AppError::Conflict(msg) => ApiError::new("CONFLICT", msg),
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::Rejected {
                code,
                message,
                missing,
            } => {
                let body = ApiError::new(code, message);
                match missing {
                    Some(missing) => body.with_missing(missing),
                    None => body,
                }
            }
            AppError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                ApiError::new("INTERNAL_ERROR", msg)
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let msg = err.to_string();
        match err {
            RepositoryError::NotFound { .. } => AppError::NotFound(msg),
            RepositoryError::Conflict { .. } => AppError::Conflict(msg),
            RepositoryError::ValidationError { .. } => AppError::BadRequest(msg),
            _ => AppError::Internal(msg),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        let msg = err.to_string();
        match err {
            PlannerError::NotFound { .. } => AppError::NotFound(msg),
            PlannerError::Conflict(_) => AppError::Conflict(msg),
            PlannerError::InvalidInput(_) => AppError::BadRequest(msg),
            PlannerError::PrerequisiteUnmet { missing, .. } => AppError::Rejected {
                code: "PREREQUISITE_UNMET",
                message: msg,
                missing: Some(missing),
            },
            PlannerError::CreditLimitExceeded { .. } => AppError::Rejected {
                code: "CREDIT_LIMIT_EXCEEDED",
                message: msg,
                missing: None,
            },
            PlannerError::CourseCountExceeded { .. } => AppError::Rejected {
                code: "COURSE_LIMIT_EXCEEDED",
                message: msg,
                missing: None,
            },
            PlannerError::Store(e) => AppError::from(e),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SemesterLabel;

    #[test]
    fn test_planner_status_codes() {
        let cases = [
            (PlannerError::not_found("plan", 7), StatusCode::NOT_FOUND),
            (
                PlannerError::Conflict("CS225 already planned".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                PlannerError::CreditLimitExceeded {
                    semester: SemesterLabel::new("FA24"),
                    current: 15,
                    adding: 4,
                    limit: 18,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                PlannerError::CourseCountExceeded {
                    semester: SemesterLabel::new("FA24"),
                    count: 6,
                    limit: 6,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                PlannerError::Store(RepositoryError::connection("pool exhausted")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_prerequisite_error_carries_missing_list() {
        let err = AppError::from(PlannerError::PrerequisiteUnmet {
            course: CourseId::new("CS225"),
            missing: vec![CourseId::new("CS125")],
        });
        match err {
            AppError::Rejected { code, missing, .. } => {
                assert_eq!(code, "PREREQUISITE_UNMET");
                assert_eq!(missing, Some(vec![CourseId::new("CS125")]));
            }
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_store_conflict_is_409() {
        let err = AppError::from(RepositoryError::conflict("net id taken"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_body_omits_missing_when_absent() {
        let json = serde_json::to_value(ApiError::new("NOT_FOUND", "plan '3' not found")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json.get("missing_prerequisites").is_none());
    }
}
