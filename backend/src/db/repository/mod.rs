//! Repository traits for the planner store.
//!
//! The store is split in two traits:
//! - [`CatalogRepository`]: the read-mostly Catalog Store
//! - [`PlanRepository`]: students, plans and planned courses
//!
//! [`FullRepository`] is the union that concrete backends implement and that
//! the application passes around as `Arc<dyn FullRepository>`.

pub mod catalog;
pub mod error;
pub mod plans;

pub use catalog::CatalogRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use plans::PlanRepository;

/// Complete store interface.
pub trait FullRepository: CatalogRepository + PlanRepository {}

impl<T: CatalogRepository + PlanRepository> FullRepository for T {}
