use super::*;
use crate::api::{AcademicPlan, Course, MajorId, Student, StudentId};
use crate::db::repositories::LocalRepository;
use crate::db::repository::{CatalogRepository, PlanRepository};
use chrono::NaiveDate;

async fn setup(courses: &[(&str, u32)]) -> (LocalRepository, AcademicPlan) {
    let repo = LocalRepository::new();
    for (id, credits) in courses {
        repo.upsert_course(&Course::new(*id, *credits)).await.unwrap();
    }
    repo.create_student(&Student {
        net_id: StudentId::new("jdoe2"),
        name: "Jane Doe".to_string(),
        major_id: MajorId::new("CS"),
        expected_graduation: None,
    })
    .await
    .unwrap();
    let plan = repo
        .create_plan(
            &StudentId::new("jdoe2"),
            NaiveDate::from_ymd_opt(2024, 8, 20).unwrap(),
        )
        .await
        .unwrap();
    (repo, plan)
}

fn numbered(prefix: &str, count: usize, credits: u32) -> Vec<(String, u32)> {
    (1..=count)
        .map(|n| (format!("{}{}", prefix, n), credits))
        .collect()
}

async fn setup_owned(courses: &[(String, u32)]) -> (LocalRepository, AcademicPlan) {
    let borrowed: Vec<(&str, u32)> = courses.iter().map(|(id, c)| (id.as_str(), *c)).collect();
    setup(&borrowed).await
}

#[tokio::test]
async fn test_add_course_success() {
    let (repo, plan) = setup(&[("CS125", 4)]).await;
    let guard = PlanMutationGuard::default();

    let outcome = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new(" cs125 ", "fa24"))
        .await
        .unwrap();

    assert_eq!(outcome.course_id.as_str(), "CS125");
    assert_eq!(outcome.semester.as_str(), "FA24");
    assert_eq!(outcome.credits, 4);
    assert_eq!(outcome.semester_credits, 4);
    assert!(!outcome.bypassed);
    assert_eq!(repo.planned_course_count(), 1);
    assert!(guard.locks().is_empty());
}

#[tokio::test]
async fn test_unknown_plan_is_checked_first() {
    let (repo, _) = setup(&[]).await;
    let err = PlanMutationGuard::default()
        .add_course(&repo, PlanId::new(404), AddCourseRequest::new("NOPE", "FA24"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { entity: "plan", .. }));
}

#[tokio::test]
async fn test_unknown_course() {
    let (repo, plan) = setup(&[]).await;
    let err = PlanMutationGuard::default()
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("CS999", "FA24"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { entity: "course", .. }));
}

#[tokio::test]
async fn test_duplicate_course_in_other_semester_conflicts() {
    let (repo, plan) = setup(&[("CS125", 4)]).await;
    let guard = PlanMutationGuard::default();
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("CS125", "FA24"))
        .await
        .unwrap();

    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("cs125", "SP25"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::Conflict(_)));
}

#[tokio::test]
async fn test_empty_input_rejected_before_store_access() {
    let (repo, plan) = setup(&[("CS125", 4)]).await;
    let guard = PlanMutationGuard::default();
    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("  ", "FA24"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidInput(_)));
    let err = guard
        .add_course(&repo, PlanId::new(404), AddCourseRequest::new("CS125", " "))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidInput(_)));
}

#[tokio::test]
async fn test_missing_prerequisites_block_add() {
    let (repo, plan) = setup(&[("CS125", 4), ("CS173", 3), ("CS225", 4)]).await;
    let cs225 = CourseId::new("CS225");
    repo.insert_prerequisite(&cs225, &CourseId::new("CS125"))
        .await
        .unwrap();
    repo.insert_prerequisite(&cs225, &CourseId::new("CS173"))
        .await
        .unwrap();
    let guard = PlanMutationGuard::default();
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("CS125", "FA24"))
        .await
        .unwrap();

    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("CS225", "SP25"))
        .await
        .unwrap_err();
    match err {
        PlannerError::PrerequisiteUnmet { course, missing } => {
            assert_eq!(course.as_str(), "CS225");
            assert_eq!(missing, vec![CourseId::new("CS173")]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(repo.planned_course_count(), 1);
}

#[tokio::test]
async fn test_prerequisite_planned_in_another_plan_counts() {
    let (repo, plan) = setup(&[("CS125", 4), ("CS225", 4)]).await;
    repo.insert_prerequisite(&CourseId::new("CS225"), &CourseId::new("CS125"))
        .await
        .unwrap();
    let other = repo
        .create_plan(&plan.net_id, plan.creation_date)
        .await
        .unwrap();
    let guard = PlanMutationGuard::default();
    guard
        .add_course(&repo, other.plan_id, AddCourseRequest::new("CS125", "FA24"))
        .await
        .unwrap();

    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("CS225", "SP25"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bypass_logs_missing_prerequisites() {
    let (repo, plan) = setup(&[("CS125", 4), ("CS225", 4)]).await;
    repo.insert_prerequisite(&CourseId::new("CS225"), &CourseId::new("CS125"))
        .await
        .unwrap();
    let guard = PlanMutationGuard::default();

    let outcome = guard
        .add_course(
            &repo,
            plan.plan_id,
            AddCourseRequest::new("CS225", "FA24")
                .with_bypass(Some("AP credit pending".to_string())),
        )
        .await
        .unwrap();
    assert!(outcome.bypassed);

    let log = repo.list_bypass_log(plan.plan_id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].course_id.as_str(), "CS225");
    assert_eq!(log[0].net_id.as_str(), "jdoe2");
    assert_eq!(log[0].reason, "AP credit pending");
    assert_eq!(log[0].missing_prerequisites, vec![CourseId::new("CS125")]);
}

#[tokio::test]
async fn test_bypass_without_missing_prerequisites_is_not_logged() {
    let (repo, plan) = setup(&[("CS125", 4)]).await;
    let outcome = PlanMutationGuard::default()
        .add_course(
            &repo,
            plan.plan_id,
            AddCourseRequest::new("CS125", "FA24").with_bypass(None),
        )
        .await
        .unwrap();
    assert!(!outcome.bypassed);
    assert_eq!(repo.bypass_log_count(), 0);
}

#[tokio::test]
async fn test_bypass_does_not_lift_credit_cap() {
    let (repo, plan) = setup(&[("BIG", 18), ("CS225", 4), ("CS125", 4)]).await;
    repo.insert_prerequisite(&CourseId::new("CS225"), &CourseId::new("CS125"))
        .await
        .unwrap();
    let guard = PlanMutationGuard::default();
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("BIG", "FA24"))
        .await
        .unwrap();

    let err = guard
        .add_course(
            &repo,
            plan.plan_id,
            AddCourseRequest::new("CS225", "FA24").with_bypass(None),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::CreditLimitExceeded { .. }));
    assert_eq!(repo.bypass_log_count(), 0);
}

#[tokio::test]
async fn test_exactly_eighteen_credits_succeeds() {
    let (repo, plan) = setup(&[("A", 4), ("B", 4), ("C", 4), ("D", 3), ("E", 3)]).await;
    let guard = PlanMutationGuard::default();
    for id in ["A", "B", "C", "D"] {
        guard
            .add_course(&repo, plan.plan_id, AddCourseRequest::new(id, "FA24"))
            .await
            .unwrap();
    }
    let outcome = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("E", "FA24"))
        .await
        .unwrap();
    assert_eq!(outcome.semester_credits, 18);
}

#[tokio::test]
async fn test_nineteen_credits_fails() {
    let (repo, plan) = setup(&[("A", 4), ("B", 4), ("C", 4), ("D", 3), ("E", 4)]).await;
    let guard = PlanMutationGuard::default();
    for id in ["A", "B", "C", "D"] {
        guard
            .add_course(&repo, plan.plan_id, AddCourseRequest::new(id, "fa24"))
            .await
            .unwrap();
    }
    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("E", "FA24"))
        .await
        .unwrap_err();
    match err {
        PlannerError::CreditLimitExceeded {
            current,
            adding,
            limit,
            ..
        } => {
            assert_eq!((current, adding, limit), (15, 4, 18));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Other semesters are unaffected.
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("E", "SP25"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_credit_overflow_is_rejected_as_over_cap() {
    let (repo, plan) = setup(&[("ONE", 1), ("HUGE", u32::MAX)]).await;
    let guard = PlanMutationGuard::default();
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("ONE", "FA24"))
        .await
        .unwrap();

    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("HUGE", "FA24"))
        .await
        .unwrap_err();
    match err {
        PlannerError::CreditLimitExceeded { current, adding, .. } => {
            assert_eq!((current, adding), (1, u32::MAX));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(repo.planned_course_count(), 1);
}

#[tokio::test]
async fn test_seventh_course_fails() {
    let courses = numbered("SEM", 7, 1);
    let (repo, plan) = setup_owned(&courses).await;
    let guard = PlanMutationGuard::default();
    for (id, _) in courses.iter().take(6) {
        guard
            .add_course(&repo, plan.plan_id, AddCourseRequest::new(id.as_str(), "FA24"))
            .await
            .unwrap();
    }
    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("SEM7", "FA24"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlannerError::CourseCountExceeded {
            count: 6,
            limit: 6,
            ..
        }
    ));
}

#[tokio::test]
async fn test_credit_cap_checked_before_course_count() {
    let courses = numbered("H", 7, 3);
    let (repo, plan) = setup_owned(&courses).await;
    let guard = PlanMutationGuard::default();
    for (id, _) in courses.iter().take(6) {
        guard
            .add_course(&repo, plan.plan_id, AddCourseRequest::new(id.as_str(), "FA24"))
            .await
            .unwrap();
    }
    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("H7", "FA24"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::CreditLimitExceeded { .. }));
}

#[tokio::test]
async fn test_custom_limits() {
    let (repo, plan) = setup(&[("A", 3), ("B", 3)]).await;
    let guard = PlanMutationGuard::new(SemesterLimits {
        max_credits: 12,
        max_courses: 1,
    });
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("A", "FA24"))
        .await
        .unwrap();
    let err = guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("B", "FA24"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::CourseCountExceeded { limit: 1, .. }));
}

#[tokio::test]
async fn test_remove_course() {
    let (repo, plan) = setup(&[("CS125", 4)]).await;
    let guard = PlanMutationGuard::default();
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("CS125", "FA24"))
        .await
        .unwrap();

    guard
        .remove_course(&repo, plan.plan_id, &CourseId::new("cs125"))
        .await
        .unwrap();
    assert_eq!(repo.planned_course_count(), 0);

    let err = guard
        .remove_course(&repo, plan.plan_id, &CourseId::new("CS125"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlannerError::NotFound {
            entity: "planned course",
            ..
        }
    ));

    let err = guard
        .remove_course(&repo, PlanId::new(404), &CourseId::new("CS125"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { entity: "plan", .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_respect_credit_cap() {
    let mut courses = numbered("R", 8, 4);
    courses.push(("BASE".to_string(), 14));
    let (repo, plan) = setup_owned(&courses).await;
    let guard = PlanMutationGuard::default();
    guard
        .add_course(&repo, plan.plan_id, AddCourseRequest::new("BASE", "FA24"))
        .await
        .unwrap();

    let tasks: Vec<_> = (1..=8)
        .map(|n| {
            let repo = repo.clone();
            let guard = guard.clone();
            let plan_id = plan.plan_id;
            tokio::spawn(async move {
                guard
                    .add_course(
                        &repo,
                        plan_id,
                        AddCourseRequest::new(format!("R{}", n), "fa24"),
                    )
                    .await
            })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    let successes = results
        .into_iter()
        .map(|r| r.unwrap())
        .filter(|r| r.is_ok())
        .count();

    assert_eq!(successes, 1);
    let credits = repo
        .list_planned_courses(plan.plan_id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.credits)
        .sum::<u32>();
    assert_eq!(credits, 18);
    assert!(guard.locks().is_empty());
}

#[tokio::test]
async fn test_lock_registry_serializes_same_key() {
    let locks = PlanLocks::new();
    let semester = SemesterLabel::new("FA24");
    let first = locks.acquire(PlanId::new(1), &semester).await;
    let _other_semester = locks.acquire(PlanId::new(1), &SemesterLabel::new("SP25")).await;
    assert_eq!(locks.len(), 2);

    let waiter = {
        let locks = locks.clone();
        let semester = semester.clone();
        tokio::spawn(async move {
            let _guard = locks.acquire(PlanId::new(1), &semester).await;
        })
    };
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    drop(first);
    waiter.await.unwrap();
}
