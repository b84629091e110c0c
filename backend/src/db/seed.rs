//! Load a [`CatalogSeed`] into any repository.

use serde::Serialize;

use super::repository::{CatalogRepository, RepositoryResult};
use crate::models::CatalogSeed;

/// Rows written per catalog table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub courses: usize,
    pub prerequisites: usize,
    pub requirements: usize,
    pub ap_credits: usize,
    /// AP credits skipped because the (student, exam) pair already existed.
    pub skipped_ap_credits: usize,
}

/// Write every table of the seed through the admin insert primitives.
///
/// Courses are upserted while prerequisite edges and requirements are
/// deduplicated, so reseeding the same file leaves those tables unchanged.
pub async fn seed_catalog<R: CatalogRepository + ?Sized>(
    repo: &R,
    seed: &CatalogSeed,
) -> RepositoryResult<SeedReport> {
    let mut report = SeedReport::default();

    for course in &seed.courses {
        if course.course_id.is_empty() {
            log::warn!("Skipping seed course with empty id");
            continue;
        }
        repo.upsert_course(course).await?;
        report.courses += 1;
    }

    for edge in &seed.prerequisites {
        repo.insert_prerequisite(&edge.course_id, &edge.prerequisite_id)
            .await?;
        report.prerequisites += 1;
    }

    for requirement in &seed.requirements {
        repo.insert_requirement(requirement).await?;
        report.requirements += 1;
    }

    for credit in &seed.ap_credits {
        match repo.insert_ap_credit(credit).await {
            Ok(()) => report.ap_credits += 1,
            Err(e) if e.is_conflict() => {
                log::debug!("AP credit already present: {}", e);
                report.skipped_ap_credits += 1;
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Seeded catalog: {} courses, {} prerequisite edges, {} requirements, {} AP credits",
        report.courses,
        report.prerequisites,
        report.requirements,
        report.ap_credits
    );
    Ok(report)
}
