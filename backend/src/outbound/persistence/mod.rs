//! PostgreSQL persistence via Diesel, `diesel-async` and bb8.
//!
//! Row structs (`models`) and table definitions (`schema`) stay private to
//! this module; the adapter translates them into domain records and maps
//! every database failure onto
//! [`AccountPersistenceError`](crate::domain::ports::AccountPersistenceError).
//!
//! ```ignore
//! use quillboard::outbound::persistence::{DbPool, DieselAccountRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/quillboard")).await?;
//! let repository = DieselAccountRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
