//! Catalog Store trait.
//!
//! Read operations used by the planner plus the administrative insert
//! primitives used by catalog seeding.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{ApCredit, Course, CourseId, MajorId, Prerequisite, Requirement};

/// Repository trait for catalog data (courses, prerequisites, requirements,
/// AP credit mappings).
///
/// Course ids passed in are already normalized (see [`CourseId`]), so
/// implementations may compare them exactly.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Check that the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Courses ====================

    /// All catalog courses ordered by id.
    async fn list_courses(&self) -> RepositoryResult<Vec<Course>>;

    /// Courses whose id contains `term` (case-insensitive), at most `limit`.
    async fn search_courses(&self, term: &str, limit: usize) -> RepositoryResult<Vec<Course>>;

    /// Fetch one course.
    ///
    /// # Returns
    /// * `Ok(None)` - No such course
    async fn get_course(&self, course_id: &CourseId) -> RepositoryResult<Option<Course>>;

    /// Insert a course or update its credit count.
    async fn upsert_course(&self, course: &Course) -> RepositoryResult<()>;

    // ==================== Prerequisites ====================

    /// Direct prerequisites of a course, in storage order.
    ///
    /// Unknown courses yield an empty list rather than an error.
    async fn get_prerequisites(&self, course_id: &CourseId) -> RepositoryResult<Vec<Prerequisite>>;

    /// Record that `course_id` requires `prerequisite_id`.
    ///
    /// Inserting an edge that already exists is a no-op.
    async fn insert_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> RepositoryResult<()>;

    // ==================== Requirements ====================

    /// Requirement list of a major, in storage order.
    async fn get_requirements(&self, major_id: &MajorId) -> RepositoryResult<Vec<Requirement>>;

    /// Distinct majors that have at least one requirement, sorted.
    async fn list_majors(&self) -> RepositoryResult<Vec<MajorId>>;

    /// Add a course to a major's requirement list.
    ///
    /// Inserting a (major, course) pair that already exists is a no-op.
    async fn insert_requirement(&self, requirement: &Requirement) -> RepositoryResult<()>;

    // ==================== AP Credits ====================

    /// Distinct AP course names, sorted.
    async fn list_ap_course_names(&self) -> RepositoryResult<Vec<String>>;

    /// Catalog course granted for an AP exam name (case-insensitive) and score.
    async fn find_ap_course_mapping(
        &self,
        course_name: &str,
        score: i32,
    ) -> RepositoryResult<Option<CourseId>>;

    async fn insert_ap_credit(&self, credit: &ApCredit) -> RepositoryResult<()>;
}
