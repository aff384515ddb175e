//! Translation of pool and Diesel failures into [`AccountPersistenceError`].
//!
//! Database detail is logged at debug level and kept in the error message so
//! the service can log it; nothing here reaches HTTP clients.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;
use crate::domain::ports::AccountPersistenceError;

pub(super) fn map_pool_error(error: PoolError) -> AccountPersistenceError {
    AccountPersistenceError::connection(error.into_message())
}

pub(super) fn map_diesel_error(error: DieselError) -> AccountPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            AccountPersistenceError::unique_violation(
                info.constraint_name().unwrap_or("unique constraint"),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            AccountPersistenceError::connection(info.message())
        }
        DieselError::DatabaseError(_, info) => AccountPersistenceError::query(info.message()),
        DieselError::BrokenTransactionManager => {
            AccountPersistenceError::connection("transaction manager is broken")
        }
        other => AccountPersistenceError::query(other.to_string()),
    }
}
