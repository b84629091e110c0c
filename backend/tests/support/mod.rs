#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use curriculum_crafter::api::{MajorId, PlanId, Student, StudentId};
use curriculum_crafter::db::{self, services, LocalRepository};
use curriculum_crafter::models::CatalogSeed;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// A small CS/MATH catalog.
///
/// ```text
/// CS124 ─┐
/// CS128 ─┼─> CS225 ─> CS233
/// CS173 ─┘      └──> CS374 <── CS173
/// MATH221 ─> MATH231
/// ```
pub const CATALOG_JSON: &str = r#"{
    "courses": [
        {"course_id": "CS124", "credits": 3},
        {"course_id": "CS128", "credits": 3},
        {"course_id": "CS173", "credits": 3},
        {"course_id": "CS225", "credits": 4},
        {"course_id": "CS233", "credits": 4},
        {"course_id": "CS374", "credits": 4},
        {"course_id": "MATH221", "credits": 4},
        {"course_id": "MATH231", "credits": 3},
        {"course_id": "ENG100", "credits": 1},
        {"course_id": "PHYS211", "credits": 4},
        {"course_id": "STAT107", "credits": 4}
    ],
    "prerequisites": [
        {"course_id": "CS225", "prerequisite_id": "CS124"},
        {"course_id": "CS225", "prerequisite_id": "CS128"},
        {"course_id": "CS225", "prerequisite_id": "CS173"},
        {"course_id": "CS233", "prerequisite_id": "CS225"},
        {"course_id": "CS374", "prerequisite_id": "CS225"},
        {"course_id": "CS374", "prerequisite_id": "CS173"},
        {"course_id": "MATH231", "prerequisite_id": "MATH221"}
    ],
    "requirements": [
        {"major_id": "CS", "course_id": "CS124", "credits": 3},
        {"major_id": "CS", "course_id": "CS128", "credits": 3},
        {"major_id": "CS", "course_id": "CS173", "credits": 3},
        {"major_id": "CS", "course_id": "CS225", "credits": 4},
        {"major_id": "CS", "course_id": "CS233", "credits": 4},
        {"major_id": "MATH", "course_id": "MATH221", "credits": 4},
        {"major_id": "MATH", "course_id": "MATH231", "credits": 3}
    ],
    "ap_credits": [
        {"net_id": "jdoe2", "course_name": "Calculus AB", "score": 5, "course_id": "MATH221"},
        {"net_id": "jdoe2", "course_name": "Computer Science A", "score": 4, "course_id": "CS124"}
    ]
}"#;

/// A repository holding [`CATALOG_JSON`] and no students.
pub async fn seeded_repository() -> LocalRepository {
    let repo = LocalRepository::new();
    let seed = CatalogSeed::from_json_str(CATALOG_JSON).expect("fixture catalog parses");
    db::seed_catalog(&repo, &seed)
        .await
        .expect("fixture catalog seeds");
    repo
}

/// Register a CS student and give them one empty plan.
pub async fn student_with_plan(repo: &LocalRepository, net_id: &str) -> PlanId {
    services::create_student(
        repo,
        Student {
            net_id: StudentId::new(net_id),
            name: format!("Student {}", net_id),
            major_id: MajorId::new("CS"),
            expected_graduation: Some(4.0),
        },
    )
    .await
    .expect("student registers");
    services::create_plan(repo, &StudentId::new(net_id))
        .await
        .expect("plan is created")
        .plan_id
}

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
