//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use uuid::Uuid;

use crate::api::{
    AcademicPlan, ApCredit, BypassLogEntry, Course, CourseId, MajorId, PlanId, PlannedCourse,
    PlannedCourseDetail, Prerequisite, Requirement, SemesterLabel, Student, StudentId,
};
use crate::db::repository::{
    CatalogRepository, ErrorContext, PlanRepository, RepositoryError, RepositoryResult,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Whether a failed operation may be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryPolicy {
    /// Reads and idempotent catalog writes.
    Transient,
    /// Plan mutations, which run once so the guard's checks stay authoritative.
    Never,
}

impl RetryPolicy {
    fn max_retries(self, configured: u32) -> u32 {
        match self {
            RetryPolicy::Transient => configured,
            RetryPolicy::Never => 0,
        }
    }
}

/// Diesel-backed repository for Postgres.
///
/// Uniqueness of (plan, course) and of student net ids is enforced by the
/// schema, so concurrent writers from other processes still cannot create
/// duplicates.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Retries up to `max_retries` times on retryable errors (pool exhaustion,
    /// dropped connections, serialization failures) with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        self.run_blocking(RetryPolicy::Transient, f).await
    }

    /// Execute a plan mutation exactly once. Failures surface to the caller.
    async fn with_conn_once<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        self.run_blocking(RetryPolicy::Never, f).await
    }

    async fn run_blocking<T, F>(&self, policy: RetryPolicy, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = policy.max_retries(self.config.max_retries);
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    log::debug!("Retrying database operation (attempt {})", attempt + 1);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Current pool state and query statistics for monitoring.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn credits_from_db(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn credits_to_db(value: u32) -> RepositoryResult<i32> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::validation(format!("Credit value {} out of range", value)))
}

fn row_to_student(row: StudentRow) -> Student {
    Student {
        net_id: StudentId::new(row.net_id),
        name: row.name,
        major_id: MajorId::new(row.major_id),
        expected_graduation: row.expected_graduation,
    }
}

fn student_to_row(student: &Student) -> StudentRow {
    StudentRow {
        net_id: student.net_id.as_str().to_string(),
        name: student.name.clone(),
        major_id: student.major_id.as_str().to_string(),
        expected_graduation: student.expected_graduation,
    }
}

fn row_to_plan(row: AcademicPlanRow) -> AcademicPlan {
    AcademicPlan {
        plan_id: PlanId::new(row.plan_id),
        net_id: StudentId::new(row.net_id),
        creation_date: row.creation_date,
    }
}

fn row_to_bypass_entry(row: BypassLogRow) -> RepositoryResult<BypassLogEntry> {
    let entry_id = Uuid::parse_str(&row.entry_id).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Invalid bypass log id: {}", e),
            ErrorContext::new("list_bypass_log").with_entity_id(&row.entry_id),
        )
    })?;
    Ok(BypassLogEntry {
        entry_id,
        net_id: StudentId::new(row.net_id),
        course_id: CourseId::new(row.course_id),
        plan_id: PlanId::new(row.plan_id),
        reason: row.reason,
        missing_prerequisites: row
            .missing_prerequisites
            .into_iter()
            .map(CourseId::new)
            .collect(),
        logged_at: row.logged_at,
    })
}

fn bypass_entry_to_row(entry: &BypassLogEntry) -> BypassLogRow {
    BypassLogRow {
        entry_id: entry.entry_id.to_string(),
        net_id: entry.net_id.as_str().to_string(),
        course_id: entry.course_id.as_str().to_string(),
        plan_id: entry.plan_id.value(),
        reason: entry.reason.clone(),
        missing_prerequisites: entry
            .missing_prerequisites
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
        logged_at: entry.logged_at,
    }
}

fn detail_rows(rows: Vec<(i64, String, String, i32)>) -> Vec<PlannedCourseDetail> {
    rows.into_iter()
        .map(|(plan_id, course_id, semester, credits)| PlannedCourseDetail {
            plan_id: PlanId::new(plan_id),
            course_id: CourseId::new(course_id),
            semester: SemesterLabel::new(semester),
            credits: credits_from_db(credits),
        })
        .collect()
}

#[async_trait]
impl CatalogRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<Course>> {
        self.with_conn(|conn| {
            let rows = courses::table
                .select(CourseRow::as_select())
                .order(courses::course_id.asc())
                .load::<CourseRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows
                .into_iter()
                .map(|r| Course::new(r.course_id, credits_from_db(r.credits)))
                .collect())
        })
        .await
    }

    async fn search_courses(&self, term: &str, limit: usize) -> RepositoryResult<Vec<Course>> {
        let escaped = term
            .trim()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let rows = courses::table
                .filter(courses::course_id.ilike(&pattern))
                .select(CourseRow::as_select())
                .order(courses::course_id.asc())
                .limit(limit)
                .load::<CourseRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows
                .into_iter()
                .map(|r| Course::new(r.course_id, credits_from_db(r.credits)))
                .collect())
        })
        .await
    }

    async fn get_course(&self, course_id: &CourseId) -> RepositoryResult<Option<Course>> {
        let id = course_id.as_str().to_string();
        self.with_conn(move |conn| {
            let row = courses::table
                .find(&id)
                .select(CourseRow::as_select())
                .first::<CourseRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(|r| Course::new(r.course_id, credits_from_db(r.credits))))
        })
        .await
    }

    async fn upsert_course(&self, course: &Course) -> RepositoryResult<()> {
        let row = CourseRow {
            course_id: course.course_id.as_str().to_string(),
            credits: credits_to_db(course.credits)?,
        };
        self.with_conn(move |conn| {
            diesel::insert_into(courses::table)
                .values(&row)
                .on_conflict(courses::course_id)
                .do_update()
                .set(courses::credits.eq(excluded(courses::credits)))
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn get_prerequisites(&self, course_id: &CourseId) -> RepositoryResult<Vec<Prerequisite>> {
        let id = course_id.as_str().to_string();
        self.with_conn(move |conn| {
            let prereq_ids: Vec<String> = prerequisites::table
                .filter(prerequisites::course_id.eq(&id))
                .order(prerequisites::position.asc())
                .select(prerequisites::prerequisite_id)
                .load(conn)
                .map_err(map_diesel_error)?;

            let credits: HashMap<String, i32> = courses::table
                .filter(courses::course_id.eq_any(&prereq_ids))
                .select((courses::course_id, courses::credits))
                .load::<(String, i32)>(conn)
                .map_err(map_diesel_error)?
                .into_iter()
                .collect();

            Ok(prereq_ids
                .into_iter()
                .map(|prereq| Prerequisite {
                    course_id: CourseId::new(&id),
                    prerequisite_credits: credits.get(&prereq).copied().map(credits_from_db),
                    prerequisite_id: CourseId::new(prereq),
                })
                .collect())
        })
        .await
    }

    async fn insert_prerequisite(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
    ) -> RepositoryResult<()> {
        let row = NewPrerequisiteRow {
            course_id: course_id.as_str().to_string(),
            prerequisite_id: prerequisite_id.as_str().to_string(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(prerequisites::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn get_requirements(&self, major_id: &MajorId) -> RepositoryResult<Vec<Requirement>> {
        let id = major_id.as_str().to_string();
        self.with_conn(move |conn| {
            let rows = requirements::table
                .filter(requirements::major_id.eq(&id))
                .order(requirements::requirement_id.asc())
                .select(RequirementRow::as_select())
                .load::<RequirementRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows
                .into_iter()
                .map(|r| Requirement {
                    major_id: MajorId::new(r.major_id),
                    course_id: CourseId::new(r.course_id),
                    credits: credits_from_db(r.credits),
                })
                .collect())
        })
        .await
    }

    async fn list_majors(&self) -> RepositoryResult<Vec<MajorId>> {
        self.with_conn(|conn| {
            let majors: Vec<String> = requirements::table
                .select(requirements::major_id)
                .distinct()
                .order(requirements::major_id.asc())
                .load(conn)
                .map_err(map_diesel_error)?;
            Ok(majors.into_iter().map(MajorId::new).collect())
        })
        .await
    }

    async fn insert_requirement(&self, requirement: &Requirement) -> RepositoryResult<()> {
        let row = NewRequirementRow {
            major_id: requirement.major_id.as_str().to_string(),
            course_id: requirement.course_id.as_str().to_string(),
            credits: credits_to_db(requirement.credits)?,
        };
        self.with_conn(move |conn| {
            diesel::insert_into(requirements::table)
                .values(&row)
                .on_conflict((requirements::major_id, requirements::course_id))
                .do_nothing()
                .execute(conn)
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn list_ap_course_names(&self) -> RepositoryResult<Vec<String>> {
        self.with_conn(|conn| {
            ap_credits::table
                .select(ap_credits::course_name)
                .distinct()
                .order(ap_credits::course_name.asc())
                .load(conn)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_ap_course_mapping(
        &self,
        course_name: &str,
        score: i32,
    ) -> RepositoryResult<Option<CourseId>> {
        let name = course_name.trim().to_string();
        self.with_conn(move |conn| {
            let rows = ap_credits::table
                .filter(ap_credits::score.eq(score))
                .filter(ap_credits::course_id.is_not_null())
                .select(ApCreditRow::as_select())
                .load::<ApCreditRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows
                .into_iter()
                .filter(|r| r.course_name.eq_ignore_ascii_case(&name))
                .find_map(|r| r.course_id.map(CourseId::new)))
        })
        .await
    }

    async fn insert_ap_credit(&self, credit: &ApCredit) -> RepositoryResult<()> {
        let row = ApCreditRow {
            net_id: credit.net_id.as_str().to_string(),
            course_name: credit.course_name.clone(),
            score: credit.score,
            course_id: credit.course_id.as_ref().map(|c| c.as_str().to_string()),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(ap_credits::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_operation("insert_ap_credit"))?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PlanRepository for PostgresRepository {
    async fn create_student(&self, student: &Student) -> RepositoryResult<()> {
        let row = student_to_row(student);
        self.with_conn(move |conn| {
            diesel::insert_into(students::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_operation("create_student"))?;
            Ok(())
        })
        .await
    }

    async fn get_student(&self, net_id: &StudentId) -> RepositoryResult<Option<Student>> {
        let id = net_id.as_str().to_string();
        self.with_conn(move |conn| {
            let row = students::table
                .find(&id)
                .select(StudentRow::as_select())
                .first::<StudentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(row_to_student))
        })
        .await
    }

    async fn list_students(&self) -> RepositoryResult<Vec<Student>> {
        self.with_conn(|conn| {
            let rows = students::table
                .select(StudentRow::as_select())
                .order(students::net_id.asc())
                .load::<StudentRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(row_to_student).collect())
        })
        .await
    }

    async fn update_student(&self, student: &Student) -> RepositoryResult<()> {
        let row = student_to_row(student);
        self.with_conn(move |conn| {
            let updated = diesel::update(students::table.find(&row.net_id))
                .set(&row)
                .execute(conn)
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Student {} not found", row.net_id),
                    ErrorContext::new("update_student")
                        .with_entity("student")
                        .with_entity_id(&row.net_id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn create_plan(
        &self,
        net_id: &StudentId,
        creation_date: NaiveDate,
    ) -> RepositoryResult<AcademicPlan> {
        let row = NewAcademicPlanRow {
            net_id: net_id.as_str().to_string(),
            creation_date,
        };
        self.with_conn(move |conn| {
            let inserted = diesel::insert_into(academic_plans::table)
                .values(&row)
                .returning(AcademicPlanRow::as_returning())
                .get_result::<AcademicPlanRow>(conn)
                .map_err(|e| match map_diesel_error(e) {
                    // Foreign key violation: the student is missing
                    RepositoryError::NotFound { .. } => RepositoryError::not_found_with_context(
                        format!("Student {} not found", row.net_id),
                        ErrorContext::new("create_plan")
                            .with_entity("student")
                            .with_entity_id(&row.net_id),
                    ),
                    other => other,
                })?;
            Ok(row_to_plan(inserted))
        })
        .await
    }

    async fn get_plan(&self, plan_id: PlanId) -> RepositoryResult<Option<AcademicPlan>> {
        self.with_conn(move |conn| {
            let row = academic_plans::table
                .find(plan_id.value())
                .select(AcademicPlanRow::as_select())
                .first::<AcademicPlanRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(row.map(row_to_plan))
        })
        .await
    }

    async fn list_plans_for_student(
        &self,
        net_id: &StudentId,
    ) -> RepositoryResult<Vec<AcademicPlan>> {
        let id = net_id.as_str().to_string();
        self.with_conn(move |conn| {
            let rows = academic_plans::table
                .filter(academic_plans::net_id.eq(&id))
                .order(academic_plans::plan_id.asc())
                .select(AcademicPlanRow::as_select())
                .load::<AcademicPlanRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(row_to_plan).collect())
        })
        .await
    }

    async fn delete_plan(&self, plan_id: PlanId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                diesel::delete(bypass_log::table.filter(bypass_log::plan_id.eq(plan_id.value())))
                    .execute(tx)?;
                diesel::delete(
                    planned_courses::table.filter(planned_courses::plan_id.eq(plan_id.value())),
                )
                .execute(tx)?;
                let deleted = diesel::delete(academic_plans::table.find(plan_id.value()))
                    .execute(tx)?;
                Ok(deleted > 0)
            })
        })
        .await
    }

    async fn list_planned_courses(
        &self,
        plan_id: PlanId,
    ) -> RepositoryResult<Vec<PlannedCourseDetail>> {
        self.with_conn(move |conn| {
            let rows = planned_courses::table
                .inner_join(courses::table)
                .filter(planned_courses::plan_id.eq(plan_id.value()))
                .order(planned_courses::position.asc())
                .select((
                    planned_courses::plan_id,
                    planned_courses::course_id,
                    planned_courses::semester,
                    courses::credits,
                ))
                .load::<(i64, String, String, i32)>(conn)
                .map_err(map_diesel_error)?;
            Ok(detail_rows(rows))
        })
        .await
    }

    async fn list_student_planned_courses(
        &self,
        net_id: &StudentId,
    ) -> RepositoryResult<Vec<PlannedCourseDetail>> {
        let id = net_id.as_str().to_string();
        self.with_conn(move |conn| {
            let rows = planned_courses::table
                .inner_join(courses::table)
                .inner_join(academic_plans::table)
                .filter(academic_plans::net_id.eq(&id))
                .order(planned_courses::position.asc())
                .select((
                    planned_courses::plan_id,
                    planned_courses::course_id,
                    planned_courses::semester,
                    courses::credits,
                ))
                .load::<(i64, String, String, i32)>(conn)
                .map_err(map_diesel_error)?;
            Ok(detail_rows(rows))
        })
        .await
    }

    async fn insert_planned_course(
        &self,
        entry: &PlannedCourse,
        bypass: Option<&BypassLogEntry>,
    ) -> RepositoryResult<()> {
        let row = NewPlannedCourseRow {
            plan_id: entry.plan_id.value(),
            course_id: entry.course_id.as_str().to_string(),
            semester: entry.semester.as_str().to_string(),
        };
        let log_row = bypass.map(bypass_entry_to_row);
        self.with_conn_once(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                diesel::insert_into(planned_courses::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|e| map_diesel_error(e).with_operation("insert_planned_course"))?;
                if let Some(log_row) = &log_row {
                    diesel::insert_into(bypass_log::table)
                        .values(log_row)
                        .execute(tx)
                        .map_err(|e| map_diesel_error(e).with_operation("insert_bypass_log"))?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete_planned_course(
        &self,
        plan_id: PlanId,
        course_id: &CourseId,
    ) -> RepositoryResult<bool> {
        let id = course_id.as_str().to_string();
        self.with_conn(move |conn| {
            let deleted = diesel::delete(
                planned_courses::table
                    .filter(planned_courses::plan_id.eq(plan_id.value()))
                    .filter(planned_courses::course_id.eq(&id)),
            )
            .execute(conn)
            .map_err(map_diesel_error)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list_bypass_log(&self, plan_id: PlanId) -> RepositoryResult<Vec<BypassLogEntry>> {
        self.with_conn(move |conn| {
            let rows = bypass_log::table
                .filter(bypass_log::plan_id.eq(plan_id.value()))
                .order(bypass_log::logged_at.asc())
                .select(BypassLogRow::as_select())
                .load::<BypassLogRow>(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(row_to_bypass_entry).collect()
        })
        .await
    }
}
