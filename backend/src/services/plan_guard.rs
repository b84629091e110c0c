//! Validated plan mutations.
//!
//! Adds run the full check sequence under a lock keyed by
//! (plan, semester), so two requests racing for the last credits of a
//! semester cannot both pass the caps. Duplicate (plan, course) rows across
//! different semesters are rejected by the store's unique key, which the
//! guard reports as a conflict.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::error::{PlannerError, PlannerResult};
use super::progress::{count_semester_courses, sum_semester_credits};
use crate::api::{
    AddCourseOutcome, BypassLogEntry, CourseId, PlanId, PlannedCourse, SemesterLabel, StudentId,
};
use crate::db::repository::FullRepository;

pub const DEFAULT_MAX_SEMESTER_CREDITS: u32 = 18;
pub const DEFAULT_MAX_SEMESTER_COURSES: usize = 6;

const DEFAULT_BYPASS_REASON: &str = "Prerequisite bypass requested";

/// Hard per-semester caps. Not bypassable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemesterLimits {
    pub max_credits: u32,
    pub max_courses: usize,
}

impl Default for SemesterLimits {
    fn default() -> Self {
        Self {
            max_credits: DEFAULT_MAX_SEMESTER_CREDITS,
            max_courses: DEFAULT_MAX_SEMESTER_COURSES,
        }
    }
}

/// A request to place a course into a plan.
#[derive(Debug, Clone)]
pub struct AddCourseRequest {
    pub course_id: CourseId,
    pub semester: SemesterLabel,
    pub bypass_prerequisites: bool,
    pub bypass_reason: Option<String>,
}

impl AddCourseRequest {
    pub fn new(course_id: impl Into<CourseId>, semester: impl Into<SemesterLabel>) -> Self {
        Self {
            course_id: course_id.into(),
            semester: semester.into(),
            bypass_prerequisites: false,
            bypass_reason: None,
        }
    }

    pub fn with_bypass(mut self, reason: Option<String>) -> Self {
        self.bypass_prerequisites = true;
        self.bypass_reason = reason;
        self
    }
}

type LockKey = (PlanId, SemesterLabel);

/// Registry of per-(plan, semester) async locks.
///
/// Entries are created on demand and dropped once no task holds or waits
/// on them.
#[derive(Debug, Clone, Default)]
pub struct PlanLocks {
    slots: Arc<Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>>,
}

/// Held for the duration of one guarded mutation.
#[derive(Debug)]
pub struct SemesterLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: LockKey,
    locks: PlanLocks,
}

impl PlanLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, plan_id: PlanId, semester: &SemesterLabel) -> SemesterLockGuard {
        let key = (plan_id, semester.clone());
        let slot = {
            let mut slots = self.slots.lock();
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = slot.lock_owned().await;
        SemesterLockGuard {
            guard: Some(guard),
            key,
            locks: self.clone(),
        }
    }

    /// Number of live lock entries.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for SemesterLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = self.locks.slots.lock();
        // Only the registry's own reference left: nobody holds or waits.
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}

/// Validates and applies plan mutations.
#[derive(Debug, Clone, Default)]
pub struct PlanMutationGuard {
    limits: SemesterLimits,
    locks: PlanLocks,
}

impl PlanMutationGuard {
    pub fn new(limits: SemesterLimits) -> Self {
        Self {
            limits,
            locks: PlanLocks::new(),
        }
    }

    pub fn limits(&self) -> SemesterLimits {
        self.limits
    }

    pub fn locks(&self) -> &PlanLocks {
        &self.locks
    }

    /// Add a course to a plan.
    ///
    /// Checks, in order, stopping at the first failure:
    /// 1. the plan exists
    /// 2. the course exists in the catalog
    /// 3. the course is not already in the plan
    /// 4. unless bypassed, every direct prerequisite is planned somewhere in
    ///    the student's plans
    /// 5. the semester stays within the credit cap
    /// 6. the semester holds fewer courses than the course cap
    ///
    /// A bypass that actually overrode missing prerequisites is written to
    /// the bypass log in the same store operation as the insert.
    pub async fn add_course<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        plan_id: PlanId,
        request: AddCourseRequest,
    ) -> PlannerResult<AddCourseOutcome> {
        let AddCourseRequest {
            course_id,
            semester,
            bypass_prerequisites,
            bypass_reason,
        } = request;

        if course_id.is_empty() {
            return Err(PlannerError::InvalidInput(
                "course_id must not be empty".to_string(),
            ));
        }
        if semester.is_empty() {
            return Err(PlannerError::InvalidInput(
                "semester must not be empty".to_string(),
            ));
        }

        let _lock = self.locks.acquire(plan_id, &semester).await;

        let plan = repo
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| PlannerError::not_found("plan", plan_id))?;

        let course = repo
            .get_course(&course_id)
            .await?
            .ok_or_else(|| PlannerError::not_found("course", &course_id))?;

        let plan_courses = repo.list_planned_courses(plan_id).await?;
        if plan_courses.iter().any(|c| c.course_id == course.course_id) {
            return Err(PlannerError::Conflict(format!(
                "{} is already in plan {}",
                course.course_id, plan_id
            )));
        }

        let missing = missing_prerequisites(repo, &plan.net_id, &course.course_id).await?;
        if !missing.is_empty() && !bypass_prerequisites {
            log::warn!(
                "Rejected {} for plan {}: missing prerequisites {:?}",
                course.course_id,
                plan_id,
                missing
            );
            return Err(PlannerError::PrerequisiteUnmet {
                course: course.course_id,
                missing,
            });
        }

        let current = sum_semester_credits(&plan_courses, &semester);
        let semester_credits = match current.checked_add(course.credits) {
            Some(total) if total <= self.limits.max_credits => total,
            _ => {
                return Err(PlannerError::CreditLimitExceeded {
                    semester,
                    current,
                    adding: course.credits,
                    limit: self.limits.max_credits,
                });
            }
        };

        let count = count_semester_courses(&plan_courses, &semester);
        if count >= self.limits.max_courses {
            return Err(PlannerError::CourseCountExceeded {
                semester,
                count,
                limit: self.limits.max_courses,
            });
        }

        let bypass_entry = if bypass_prerequisites && !missing.is_empty() {
            log::warn!(
                "{} bypassing prerequisites {:?} for {} in plan {}",
                plan.net_id,
                missing,
                course.course_id,
                plan_id
            );
            Some(BypassLogEntry::new(
                plan.net_id.clone(),
                course.course_id.clone(),
                plan_id,
                bypass_reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_BYPASS_REASON.to_string()),
                missing,
            ))
        } else {
            None
        };

        let entry = PlannedCourse {
            plan_id,
            course_id: course.course_id.clone(),
            semester: semester.clone(),
        };
        repo.insert_planned_course(&entry, bypass_entry.as_ref())
            .await
            .map_err(|e| PlannerError::from_store(e, "plan", plan_id))?;

        log::info!(
            "Added {} ({} credits) to plan {} for {}",
            entry.course_id,
            course.credits,
            plan_id,
            semester
        );

        Ok(AddCourseOutcome {
            plan_id,
            course_id: entry.course_id,
            semester: entry.semester,
            credits: course.credits,
            semester_credits,
            bypassed: bypass_entry.is_some(),
        })
    }

    /// Remove a course from a plan.
    pub async fn remove_course<R: FullRepository + ?Sized>(
        &self,
        repo: &R,
        plan_id: PlanId,
        course_id: &CourseId,
    ) -> PlannerResult<()> {
        if course_id.is_empty() {
            return Err(PlannerError::InvalidInput(
                "course_id must not be empty".to_string(),
            ));
        }
        if repo.get_plan(plan_id).await?.is_none() {
            return Err(PlannerError::not_found("plan", plan_id));
        }
        if !repo.delete_planned_course(plan_id, course_id).await? {
            return Err(PlannerError::not_found("planned course", course_id));
        }
        log::info!("Removed {} from plan {}", course_id, plan_id);
        Ok(())
    }
}

/// Direct prerequisites of `course_id` absent from every plan the student
/// owns, in the order the catalog lists them.
pub async fn missing_prerequisites<R: FullRepository + ?Sized>(
    repo: &R,
    net_id: &StudentId,
    course_id: &CourseId,
) -> PlannerResult<Vec<CourseId>> {
    let prerequisites = repo.get_prerequisites(course_id).await?;
    if prerequisites.is_empty() {
        return Ok(Vec::new());
    }

    let planned: HashSet<CourseId> = repo
        .list_student_planned_courses(net_id)
        .await?
        .into_iter()
        .map(|c| c.course_id)
        .collect();

    let mut seen = HashSet::new();
    Ok(prerequisites
        .into_iter()
        .map(|p| p.prerequisite_id)
        .filter(|id| !planned.contains(id) && seen.insert(id.clone()))
        .collect())
}

#[cfg(test)]
#[path = "plan_guard_tests.rs"]
mod tests;
