//! Store layer for the planner.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer / binary                                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  crate::services  (graph builder, aggregator, guard)    │
//! │  db::services     (thin CRUD and catalog queries)       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!          ┌──────────┴───────────┐
//!   LocalRepository        PostgresRepository
//!    (in-memory)          (Diesel, feature-gated)
//! ```
//!
//! There is no process-wide repository. Build one with
//! [`RepositoryFactory`] and pass the handle to whatever needs it:
//!
//! ```ignore
//! use curriculum_crafter::db::{services, RepositoryFactory};
//!
//! let repo = RepositoryFactory::from_env().await?;
//! let courses = services::list_courses(repo.as_ref()).await?;
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod seed;
pub mod services;


// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    CatalogRepository, ErrorContext, FullRepository, PlanRepository, RepositoryError,
    RepositoryResult,
};
pub use seed::{seed_catalog, SeedReport};
