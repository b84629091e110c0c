//! Degree progress and credit aggregation.

use std::collections::HashSet;

use super::error::{PlannerError, PlannerResult};
use crate::api::{
    CourseId, MajorId, PlanId, PlannedCourseDetail, Requirement, RequirementProgress,
    RequirementStatus, SemesterCredits, SemesterLabel, SemesterSummary, StudentId, TotalCredits,
};
use crate::db::repository::FullRepository;

/// Split a major's requirement list by whether each course is planned.
///
/// Relative order within each partition follows `requirements`.
pub(crate) fn partition_requirements(
    major_id: MajorId,
    requirements: Vec<Requirement>,
    planned: &HashSet<CourseId>,
) -> RequirementProgress {
    let (fulfilled, unfulfilled): (Vec<_>, Vec<_>) = requirements
        .into_iter()
        .map(|r| {
            let done = planned.contains(&r.course_id);
            (
                done,
                RequirementStatus {
                    course_id: r.course_id,
                    credits: r.credits,
                },
            )
        })
        .partition(|(done, _)| *done);

    RequirementProgress {
        major_id,
        fulfilled: fulfilled.into_iter().map(|(_, s)| s).collect(),
        unfulfilled: unfulfilled.into_iter().map(|(_, s)| s).collect(),
    }
}

/// Saturates at `u32::MAX` rather than wrapping.
pub(crate) fn sum_semester_credits(courses: &[PlannedCourseDetail], semester: &SemesterLabel) -> u32 {
    courses
        .iter()
        .filter(|c| semester.matches(c.semester.as_str()))
        .fold(0u32, |acc, c| acc.saturating_add(c.credits))
}

pub(crate) fn count_semester_courses(
    courses: &[PlannedCourseDetail],
    semester: &SemesterLabel,
) -> usize {
    courses
        .iter()
        .filter(|c| semester.matches(c.semester.as_str()))
        .count()
}

/// One summary line per distinct semester, in order of first appearance.
pub(crate) fn summarize_semesters(courses: &[PlannedCourseDetail]) -> Vec<SemesterSummary> {
    let mut summaries: Vec<SemesterSummary> = Vec::new();
    for course in courses {
        match summaries
            .iter_mut()
            .find(|s| s.semester.matches(course.semester.as_str()))
        {
            Some(summary) => {
                summary.credits = summary.credits.saturating_add(course.credits);
                summary.course_count += 1;
            }
            None => summaries.push(SemesterSummary {
                semester: course.semester.clone(),
                credits: course.credits,
                course_count: 1,
            }),
        }
    }
    summaries
}

/// Fulfilled and unfulfilled requirements of the student's declared major,
/// judged against the courses planned in any of the student's plans.
pub async fn fulfilled_requirements<R: FullRepository + ?Sized>(
    repo: &R,
    net_id: &StudentId,
) -> PlannerResult<RequirementProgress> {
    let student = repo
        .get_student(net_id)
        .await?
        .ok_or_else(|| PlannerError::not_found("student", net_id))?;

    let requirements = repo.get_requirements(&student.major_id).await?;
    let planned: HashSet<CourseId> = repo
        .list_student_planned_courses(net_id)
        .await?
        .into_iter()
        .map(|c| c.course_id)
        .collect();

    let progress = partition_requirements(student.major_id, requirements, &planned);
    log::debug!(
        "Requirement progress for {}: {} fulfilled, {} unfulfilled",
        net_id,
        progress.fulfilled.len(),
        progress.unfulfilled.len()
    );
    Ok(progress)
}

/// Credits planned in one semester of a plan. Zero when nothing matches.
pub async fn semester_credits<R: FullRepository + ?Sized>(
    repo: &R,
    plan_id: PlanId,
    semester: &SemesterLabel,
) -> PlannerResult<SemesterCredits> {
    if semester.is_empty() {
        return Err(PlannerError::InvalidInput(
            "semester must not be empty".to_string(),
        ));
    }
    if repo.get_plan(plan_id).await?.is_none() {
        return Err(PlannerError::not_found("plan", plan_id));
    }
    let courses = repo.list_planned_courses(plan_id).await?;
    Ok(SemesterCredits {
        plan_id,
        semester: semester.clone(),
        credits: sum_semester_credits(&courses, semester),
    })
}

/// Credits of every planned course across all of the student's plans.
///
/// A course planned in two different plans counts twice.
pub async fn total_planned_credits<R: FullRepository + ?Sized>(
    repo: &R,
    net_id: &StudentId,
) -> PlannerResult<TotalCredits> {
    let student = repo
        .get_student(net_id)
        .await?
        .ok_or_else(|| PlannerError::not_found("student", net_id))?;
    let total = repo
        .list_student_planned_courses(net_id)
        .await?
        .iter()
        .fold(0u32, |acc, c| acc.saturating_add(c.credits));
    Ok(TotalCredits {
        net_id: student.net_id,
        name: student.name,
        total_planned_credits: total,
    })
}

pub async fn semester_breakdown<R: FullRepository + ?Sized>(
    repo: &R,
    plan_id: PlanId,
) -> PlannerResult<Vec<SemesterSummary>> {
    if repo.get_plan(plan_id).await?.is_none() {
        return Err(PlannerError::not_found("plan", plan_id));
    }
    let courses = repo.list_planned_courses(plan_id).await?;
    Ok(summarize_semesters(&courses))
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
