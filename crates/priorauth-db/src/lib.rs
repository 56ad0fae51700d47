//! PriorAuth Database Layer
//!
//! This crate provides submission storage for the intake service. It includes:
//!
//! - Connection pool management with sqlx
//! - Idempotent schema bootstrap for the submissions table
//! - A PostgreSQL submission repository
//! - A bounded in-memory submission repository

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, ensure_schema};
pub use repositories::*;

// Re-export commonly used types
pub use priorauth_core::{AppError, AppResult};
pub use sqlx::PgPool;
