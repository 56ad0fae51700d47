//! Repository implementations
//!
//! Concrete implementations of the `SubmissionRepository` trait defined in
//! priorauth-core: PostgreSQL via sqlx for production, a bounded in-memory
//! store for tests and database-less deployments.

pub mod memory_repo;
pub mod submission_repo;

pub use memory_repo::{InMemorySubmissionRepository, DEFAULT_RETENTION_CAP};
pub use submission_repo::PgSubmissionRepository;
