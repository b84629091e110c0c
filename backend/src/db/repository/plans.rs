//! Student and plan store trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::api::{
    AcademicPlan, BypassLogEntry, CourseId, PlanId, PlannedCourse, PlannedCourseDetail, Student,
    StudentId,
};

/// Repository trait for students, academic plans and planned courses.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    // ==================== Students ====================

    /// Register a student.
    ///
    /// # Returns
    /// * `Err(RepositoryError::Conflict)` - The net id is already taken
    async fn create_student(&self, student: &Student) -> RepositoryResult<()>;

    async fn get_student(&self, net_id: &StudentId) -> RepositoryResult<Option<Student>>;

    async fn list_students(&self) -> RepositoryResult<Vec<Student>>;

    /// Overwrite a student's profile.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - No such student
    async fn update_student(&self, student: &Student) -> RepositoryResult<()>;

    // ==================== Plans ====================

    /// Create an empty plan with a freshly assigned id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - The owning student does not exist
    async fn create_plan(
        &self,
        net_id: &StudentId,
        creation_date: NaiveDate,
    ) -> RepositoryResult<AcademicPlan>;

    async fn get_plan(&self, plan_id: PlanId) -> RepositoryResult<Option<AcademicPlan>>;

    async fn list_plans_for_student(&self, net_id: &StudentId)
        -> RepositoryResult<Vec<AcademicPlan>>;

    /// Delete a plan together with its planned courses and bypass log.
    ///
    /// # Returns
    /// * `Ok(false)` - No such plan
    async fn delete_plan(&self, plan_id: PlanId) -> RepositoryResult<bool>;

    // ==================== Planned Courses ====================

    /// Planned courses of one plan joined with catalog credits, in insertion order.
    async fn list_planned_courses(&self, plan_id: PlanId)
        -> RepositoryResult<Vec<PlannedCourseDetail>>;

    /// Planned courses across every plan the student owns.
    async fn list_student_planned_courses(
        &self,
        net_id: &StudentId,
    ) -> RepositoryResult<Vec<PlannedCourseDetail>>;

    /// Insert a planned course, and the bypass audit entry if one is given,
    /// as a single unit. Either both rows are written or neither is.
    ///
    /// # Returns
    /// * `Err(RepositoryError::Conflict)` - The (plan, course) pair already exists
    /// * `Err(RepositoryError::NotFound)` - Plan or course does not exist
    async fn insert_planned_course(
        &self,
        entry: &PlannedCourse,
        bypass: Option<&BypassLogEntry>,
    ) -> RepositoryResult<()>;

    /// Remove a course from a plan.
    ///
    /// # Returns
    /// * `Ok(false)` - The course was not in the plan
    async fn delete_planned_course(
        &self,
        plan_id: PlanId,
        course_id: &CourseId,
    ) -> RepositoryResult<bool>;

    /// Bypass audit entries recorded against a plan, oldest first.
    async fn list_bypass_log(&self, plan_id: PlanId) -> RepositoryResult<Vec<BypassLogEntry>>;
}
