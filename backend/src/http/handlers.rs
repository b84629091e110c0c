//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to
//! [`crate::db::services`] for CRUD and [`crate::services`] for the planning
//! rules.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AddCourseBody, ApMappingQuery, CreatePlanRequest, CreateStudentRequest, HealthResponse,
    SearchQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    AcademicPlan, AddCourseOutcome, ApCourseMapping, BypassLogEntry, Course, CourseId, MajorId,
    PlanCourses, PlanId, Prerequisite, PrerequisiteGraph, RequirementProgress, SemesterCredits,
    SemesterLabel, SemesterSummary, Student, StudentId, TotalCredits,
};
use crate::db::services as db_services;
use crate::models::StudentProfileUpdate;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type Created<T> = Result<(StatusCode, Json<T>), AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Catalog
// =============================================================================

/// GET /v1/courses
pub async fn list_courses(State(state): State<AppState>) -> HandlerResult<Vec<Course>> {
    Ok(Json(db_services::list_courses(state.repository.as_ref()).await?))
}

/// GET /v1/courses/search?q=
pub async fn search_courses(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<Vec<Course>> {
    Ok(Json(
        db_services::search_courses(state.repository.as_ref(), &query.q).await?,
    ))
}

/// GET /v1/courses/{course_id}/prerequisites
pub async fn get_prerequisites(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> HandlerResult<Vec<Prerequisite>> {
    let course_id = CourseId::new(course_id);
    Ok(Json(
        db_services::direct_prerequisites(state.repository.as_ref(), &course_id).await?,
    ))
}

/// GET /v1/courses/{course_id}/prerequisite-graph
pub async fn get_prerequisite_graph(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> HandlerResult<PrerequisiteGraph> {
    let course_id = CourseId::new(course_id);
    Ok(Json(
        services::build_prerequisite_graph(state.repository.as_ref(), &course_id).await?,
    ))
}

/// GET /v1/majors
pub async fn list_majors(State(state): State<AppState>) -> HandlerResult<Vec<MajorId>> {
    Ok(Json(db_services::list_majors(state.repository.as_ref()).await?))
}

/// GET /v1/ap-courses
pub async fn list_ap_courses(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(
        db_services::list_ap_course_names(state.repository.as_ref()).await?,
    ))
}

/// GET /v1/ap-courses/mapping?course_name=&score=
pub async fn get_ap_course_mapping(
    State(state): State<AppState>,
    Query(query): Query<ApMappingQuery>,
) -> HandlerResult<ApCourseMapping> {
    Ok(Json(
        db_services::ap_course_mapping(state.repository.as_ref(), &query.course_name, query.score)
            .await?,
    ))
}

// =============================================================================
// Students
// =============================================================================

/// POST /v1/students
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> Created<Student> {
    let student = Student {
        net_id: request.net_id,
        name: request.name.trim().to_string(),
        major_id: request.major_id,
        expected_graduation: request.expected_graduation,
    };
    let student = db_services::create_student(state.repository.as_ref(), student).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// GET /v1/students
pub async fn list_students(State(state): State<AppState>) -> HandlerResult<Vec<Student>> {
    Ok(Json(db_services::list_students(state.repository.as_ref()).await?))
}

/// GET /v1/students/{net_id}
pub async fn get_student(
    State(state): State<AppState>,
    Path(net_id): Path<String>,
) -> HandlerResult<Student> {
    let net_id = StudentId::new(net_id);
    Ok(Json(
        db_services::get_student(state.repository.as_ref(), &net_id).await?,
    ))
}

/// PUT /v1/students/{net_id}
pub async fn update_student(
    State(state): State<AppState>,
    Path(net_id): Path<String>,
    Json(update): Json<StudentProfileUpdate>,
) -> HandlerResult<Student> {
    let net_id = StudentId::new(net_id);
    Ok(Json(
        db_services::update_student_profile(state.repository.as_ref(), &net_id, update).await?,
    ))
}

/// GET /v1/students/{net_id}/plans
pub async fn list_student_plans(
    State(state): State<AppState>,
    Path(net_id): Path<String>,
) -> HandlerResult<Vec<AcademicPlan>> {
    let net_id = StudentId::new(net_id);
    Ok(Json(
        db_services::list_student_plans(state.repository.as_ref(), &net_id).await?,
    ))
}

/// GET /v1/students/{net_id}/requirements
pub async fn get_fulfilled_requirements(
    State(state): State<AppState>,
    Path(net_id): Path<String>,
) -> HandlerResult<RequirementProgress> {
    let net_id = StudentId::new(net_id);
    Ok(Json(
        services::fulfilled_requirements(state.repository.as_ref(), &net_id).await?,
    ))
}

/// GET /v1/students/{net_id}/total-credits
pub async fn get_total_credits(
    State(state): State<AppState>,
    Path(net_id): Path<String>,
) -> HandlerResult<TotalCredits> {
    let net_id = StudentId::new(net_id);
    Ok(Json(
        services::total_planned_credits(state.repository.as_ref(), &net_id).await?,
    ))
}

// =============================================================================
// Plans
// =============================================================================

/// POST /v1/plans
pub async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Created<AcademicPlan> {
    let plan = db_services::create_plan(state.repository.as_ref(), &request.net_id).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /v1/plans/{plan_id}
pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<i64>,
) -> HandlerResult<PlanCourses> {
    Ok(Json(
        db_services::get_plan_courses(state.repository.as_ref(), PlanId::new(plan_id)).await?,
    ))
}

/// DELETE /v1/plans/{plan_id}
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_plan(state.repository.as_ref(), PlanId::new(plan_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/plans/{plan_id}/courses
///
/// Runs the full validation sequence; a refusal comes back as 400 with a
/// machine-readable code, and unmet prerequisites are listed.
pub async fn add_course(
    State(state): State<AppState>,
    Path(plan_id): Path<i64>,
    Json(body): Json<AddCourseBody>,
) -> Created<AddCourseOutcome> {
    let outcome = state
        .planner
        .add_course(state.repository.as_ref(), PlanId::new(plan_id), body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// DELETE /v1/plans/{plan_id}/courses/{course_id}
pub async fn remove_course(
    State(state): State<AppState>,
    Path((plan_id, course_id)): Path<(i64, String)>,
) -> Result<StatusCode, AppError> {
    state
        .planner
        .remove_course(
            state.repository.as_ref(),
            PlanId::new(plan_id),
            &CourseId::new(course_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/plans/{plan_id}/semesters
pub async fn get_semester_breakdown(
    State(state): State<AppState>,
    Path(plan_id): Path<i64>,
) -> HandlerResult<Vec<SemesterSummary>> {
    Ok(Json(
        services::semester_breakdown(state.repository.as_ref(), PlanId::new(plan_id)).await?,
    ))
}

/// GET /v1/plans/{plan_id}/semesters/{semester}/credits
pub async fn get_semester_credits(
    State(state): State<AppState>,
    Path((plan_id, semester)): Path<(i64, String)>,
) -> HandlerResult<SemesterCredits> {
    let semester = SemesterLabel::new(semester);
    Ok(Json(
        services::semester_credits(state.repository.as_ref(), PlanId::new(plan_id), &semester)
            .await?,
    ))
}

/// GET /v1/plans/{plan_id}/bypass-log
pub async fn get_bypass_log(
    State(state): State<AppState>,
    Path(plan_id): Path<i64>,
) -> HandlerResult<Vec<BypassLogEntry>> {
    Ok(Json(
        db_services::list_bypass_log(state.repository.as_ref(), PlanId::new(plan_id)).await?,
    ))
}
