//! Account use-cases: validated, transactional creation and the listing.
//!
//! Creation validates first and touches storage only afterwards. A user with
//! the same email short-circuits to a conflict before any write; the same
//! collision surfacing from the transaction (two requests racing past the
//! pre-check) is reported identically.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    AccountCommand, AccountPersistenceError, AccountRepository, AccountTransaction, UsersQuery,
};
use crate::domain::{
    AccountSubmission, AccountValidationError, CreatedAccount, EmailAddress, Error, NewAccount,
    UserWithPosts,
};

/// Message returned whenever the email is already taken.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "User with this email already exists";
/// Message returned for any unexpected creation failure.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create user";
/// Message returned for any listing failure.
pub const LIST_FAILED_MESSAGE: &str = "Failed to fetch users";

/// Why an account could not be created.
#[derive(Debug, thiserror::Error)]
pub enum AccountCreationError {
    /// The submission failed validation; nothing was read or written.
    #[error(transparent)]
    Validation(#[from] AccountValidationError),
    /// A user with this email exists, found either by the pre-check or by the
    /// storage constraint.
    #[error("user with email {email} already exists")]
    Conflict {
        /// The colliding email.
        email: String,
    },
    /// Storage failed for any other reason.
    #[error("account write failed: {0}")]
    Internal(#[source] AccountPersistenceError),
}

impl From<AccountCreationError> for Error {
    fn from(value: AccountCreationError) -> Self {
        match value {
            AccountCreationError::Validation(reason) => Self::invalid_request(reason.to_string())
                .with_details(json!({ "field": reason.field(), "code": reason.code() })),
            AccountCreationError::Conflict { .. } => Self::conflict(DUPLICATE_EMAIL_MESSAGE),
            AccountCreationError::Internal(_) => Self::internal(CREATE_FAILED_MESSAGE),
        }
    }
}

/// Account service implementing [`AccountCommand`] and [`UsersQuery`].
pub struct AccountService<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> Clone for AccountService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ?Sized> AccountService<R> {
    /// Create a service over `repository`.
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    /// Validate and persist a user with an optional first post.
    ///
    /// # Errors
    /// See [`AccountCreationError`].
    pub async fn create(
        &self,
        submission: AccountSubmission,
    ) -> Result<CreatedAccount, AccountCreationError> {
        let account = NewAccount::try_from(submission)?;
        let email = &account.user.email;

        let existing = self
            .repository
            .find_user_by_email(email)
            .await
            .map_err(AccountCreationError::Internal)?;
        if existing.is_some() {
            return Err(conflict(email));
        }

        let mut transaction = self
            .repository
            .begin()
            .await
            .map_err(AccountCreationError::Internal)?;
        match write_account(transaction.as_mut(), &account).await {
            Ok(created) => {
                transaction
                    .commit()
                    .await
                    .map_err(|err| classify(err, email))?;
                Ok(created)
            }
            Err(err) => {
                if let Err(rollback_error) = transaction.rollback().await {
                    warn!(error = %rollback_error, "rollback after failed account write failed");
                }
                Err(classify(err, email))
            }
        }
    }
}

async fn write_account<T>(
    transaction: &mut T,
    account: &NewAccount,
) -> Result<CreatedAccount, AccountPersistenceError>
where
    T: AccountTransaction + ?Sized,
{
    let user = transaction.create_user(&account.user).await?;
    let post = match &account.post {
        Some(post) => Some(transaction.create_post(user.id, post).await?),
        None => None,
    };
    Ok(CreatedAccount { user, post })
}

fn conflict(email: &EmailAddress) -> AccountCreationError {
    AccountCreationError::Conflict {
        email: email.to_string(),
    }
}

fn classify(error: AccountPersistenceError, email: &EmailAddress) -> AccountCreationError {
    match error {
        AccountPersistenceError::UniqueViolation { .. } => conflict(email),
        other => AccountCreationError::Internal(other),
    }
}

#[async_trait]
impl<R> AccountCommand for AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    async fn create_account(
        &self,
        submission: AccountSubmission,
    ) -> Result<CreatedAccount, Error> {
        match self.create(submission).await {
            Ok(created) => {
                info!(
                    user_id = %created.user.id,
                    with_post = created.post.is_some(),
                    "account created"
                );
                Ok(created)
            }
            Err(err) => {
                match &err {
                    AccountCreationError::Validation(reason) => {
                        debug!(field = reason.field(), %reason, "account submission rejected");
                    }
                    AccountCreationError::Conflict { .. } => {
                        info!("account creation hit an existing email");
                    }
                    AccountCreationError::Internal(source) => {
                        error!(error = %source, "account creation failed");
                    }
                }
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl<R> UsersQuery for AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    async fn list_users(&self) -> Result<Vec<UserWithPosts>, Error> {
        self.repository
            .list_users_with_posts()
            .await
            .map_err(|err| {
                error!(error = %err, "listing users failed");
                Error::internal(LIST_FAILED_MESSAGE)
            })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
