//! Driving port for creating accounts.
//!
//! Inbound adapters and the assistant submission flow call this port; the
//! returned [`Error`] already carries the client-facing message and code.

use async_trait::async_trait;

use crate::domain::{AccountSubmission, CreatedAccount, Error};

/// Use-case port creating a user and optional first post atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Validate `submission`, then write the user and post together.
    ///
    /// Failures map to [`crate::domain::ErrorCode::InvalidRequest`],
    /// [`crate::domain::ErrorCode::Conflict`] or
    /// [`crate::domain::ErrorCode::InternalError`].
    async fn create_account(&self, submission: AccountSubmission)
    -> Result<CreatedAccount, Error>;
}
