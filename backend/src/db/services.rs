//! Repository-agnostic catalog queries and student/plan CRUD.
//!
//! These functions take the store handle explicitly and translate "absent"
//! results into [`RepositoryError::NotFound`] so callers do not repeat the
//! lookup-then-fail dance. The planning rules themselves live in
//! [`crate::services`].

use chrono::Utc;

use super::repository::{
    CatalogRepository, ErrorContext, FullRepository, PlanRepository, RepositoryError,
    RepositoryResult,
};
use crate::api::{
    AcademicPlan, ApCourseMapping, BypassLogEntry, Course, CourseId, MajorId, PlanCourses, PlanId,
    Prerequisite, Student, StudentId,
};
use crate::models::StudentProfileUpdate;
use crate::routes::catalog::SEARCH_LIMIT;

fn not_found(operation: &str, entity: &str, id: impl ToString) -> RepositoryError {
    let id = id.to_string();
    RepositoryError::not_found_with_context(
        format!("{} {} not found", entity, id),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id),
    )
}

pub async fn health_check<R: CatalogRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Catalog ====================

pub async fn list_courses<R: CatalogRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Course>> {
    repo.list_courses().await
}

/// Case-insensitive substring search on course ids, capped at
/// [`SEARCH_LIMIT`] rows. An empty term lists the first rows of the catalog.
pub async fn search_courses<R: CatalogRepository + ?Sized>(
    repo: &R,
    term: &str,
) -> RepositoryResult<Vec<Course>> {
    repo.search_courses(term.trim(), SEARCH_LIMIT).await
}

pub async fn get_course<R: CatalogRepository + ?Sized>(
    repo: &R,
    course_id: &CourseId,
) -> RepositoryResult<Course> {
    repo.get_course(course_id)
        .await?
        .ok_or_else(|| not_found("get_course", "course", course_id))
}

/// Direct prerequisites of a course, each with the prerequisite's credits
/// when it exists in the catalog.
pub async fn direct_prerequisites<R: CatalogRepository + ?Sized>(
    repo: &R,
    course_id: &CourseId,
) -> RepositoryResult<Vec<Prerequisite>> {
    repo.get_prerequisites(course_id).await
}

pub async fn list_majors<R: CatalogRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<MajorId>> {
    repo.list_majors().await
}

pub async fn list_ap_course_names<R: CatalogRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<String>> {
    repo.list_ap_course_names().await
}

/// Catalog course granted for an AP exam at a given score.
pub async fn ap_course_mapping<R: CatalogRepository + ?Sized>(
    repo: &R,
    course_name: &str,
    score: i32,
) -> RepositoryResult<ApCourseMapping> {
    let name = course_name.trim();
    if name.is_empty() {
        return Err(RepositoryError::validation("AP course name must not be empty"));
    }
    let course_id = repo
        .find_ap_course_mapping(name, score)
        .await?
        .ok_or_else(|| {
            not_found(
                "ap_course_mapping",
                "AP mapping",
                format!("{} (score {})", name, score),
            )
        })?;
    Ok(ApCourseMapping {
        course_name: name.to_string(),
        score,
        course_id,
    })
}

// ==================== Students ====================

pub async fn create_student<R: PlanRepository + ?Sized>(
    repo: &R,
    student: Student,
) -> RepositoryResult<Student> {
    if student.net_id.is_empty() {
        return Err(RepositoryError::validation("net_id must not be empty"));
    }
    if student.name.trim().is_empty() {
        return Err(RepositoryError::validation("name must not be empty"));
    }
    repo.create_student(&student).await?;
    log::info!("Registered student {}", student.net_id);
    Ok(student)
}

pub async fn get_student<R: PlanRepository + ?Sized>(
    repo: &R,
    net_id: &StudentId,
) -> RepositoryResult<Student> {
    repo.get_student(net_id)
        .await?
        .ok_or_else(|| not_found("get_student", "student", net_id))
}

pub async fn list_students<R: PlanRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Student>> {
    repo.list_students().await
}

/// Apply a partial profile update and return the stored result.
pub async fn update_student_profile<R: PlanRepository + ?Sized>(
    repo: &R,
    net_id: &StudentId,
    update: StudentProfileUpdate,
) -> RepositoryResult<Student> {
    let mut student = get_student(repo, net_id).await?;
    student.apply(update);
    repo.update_student(&student).await?;
    Ok(student)
}

// ==================== Plans ====================

/// Create an empty plan dated today.
pub async fn create_plan<R: PlanRepository + ?Sized>(
    repo: &R,
    net_id: &StudentId,
) -> RepositoryResult<AcademicPlan> {
    let plan = repo.create_plan(net_id, Utc::now().date_naive()).await?;
    log::info!("Created plan {} for {}", plan.plan_id, net_id);
    Ok(plan)
}

pub async fn get_plan<R: PlanRepository + ?Sized>(
    repo: &R,
    plan_id: PlanId,
) -> RepositoryResult<AcademicPlan> {
    repo.get_plan(plan_id)
        .await?
        .ok_or_else(|| not_found("get_plan", "plan", plan_id))
}

pub async fn list_student_plans<R: PlanRepository + ?Sized>(
    repo: &R,
    net_id: &StudentId,
) -> RepositoryResult<Vec<AcademicPlan>> {
    get_student(repo, net_id).await?;
    repo.list_plans_for_student(net_id).await
}

/// A plan with its courses and their catalog credits.
pub async fn get_plan_courses<R: PlanRepository + ?Sized>(
    repo: &R,
    plan_id: PlanId,
) -> RepositoryResult<PlanCourses> {
    let plan = get_plan(repo, plan_id).await?;
    let courses = repo.list_planned_courses(plan_id).await?;
    Ok(PlanCourses { plan, courses })
}

/// Delete a plan along with its planned courses and bypass log.
pub async fn delete_plan<R: PlanRepository + ?Sized>(
    repo: &R,
    plan_id: PlanId,
) -> RepositoryResult<()> {
    if !repo.delete_plan(plan_id).await? {
        return Err(not_found("delete_plan", "plan", plan_id));
    }
    log::info!("Deleted plan {}", plan_id);
    Ok(())
}

pub async fn list_bypass_log<R: PlanRepository + ?Sized>(
    repo: &R,
    plan_id: PlanId,
) -> RepositoryResult<Vec<BypassLogEntry>> {
    get_plan(repo, plan_id).await?;
    repo.list_bypass_log(plan_id).await
}

/// Whether the store holds any catalog rows at all.
pub async fn catalog_is_empty<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    Ok(repo.list_courses().await?.is_empty())
}
