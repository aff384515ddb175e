//! Driven port for account storage.
//!
//! Writes happen inside an [`AccountTransaction`] obtained from
//! [`AccountRepository::begin`]. A transaction is a scope guard: callers finish
//! it with [`AccountTransaction::commit`] or [`AccountTransaction::rollback`],
//! and implementations must roll back when one is dropped unfinished, so an
//! early return or a cancelled request never leaves partial records behind.

use async_trait::async_trait;

use crate::domain::{EmailAddress, NewPost, NewUser, Post, User, UserId, UserWithPosts};

use super::define_port_error;

define_port_error! {
    /// Failures reported by account storage adapters.
    pub enum AccountPersistenceError {
        /// Storage could not be reached or a connection could not be checked out.
        Connection { message: String } =>
            "account storage connection failed: {message}",
        /// A statement failed or returned rows that could not be mapped.
        Query { message: String } =>
            "account storage query failed: {message}",
        /// A write collided with the unique email constraint.
        UniqueViolation { message: String } =>
            "account storage unique constraint violated: {message}",
    }
}

/// One open unit of account writes.
#[async_trait]
pub trait AccountTransaction: Send {
    /// Insert a user and return it with its assigned identifier.
    async fn create_user(&mut self, user: &NewUser) -> Result<User, AccountPersistenceError>;

    /// Insert a post owned by `author`.
    async fn create_post(
        &mut self,
        author: UserId,
        post: &NewPost,
    ) -> Result<Post, AccountPersistenceError>;

    /// Make every write in this transaction durable.
    ///
    /// A unique-email collision detected at this point is reported as
    /// [`AccountPersistenceError::UniqueViolation`].
    async fn commit(self: Box<Self>) -> Result<(), AccountPersistenceError>;

    /// Discard every write in this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), AccountPersistenceError>;
}

/// Storage for users and their posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find a user by exact (already trimmed) email.
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountPersistenceError>;

    /// Open a write transaction.
    async fn begin(&self) -> Result<Box<dyn AccountTransaction>, AccountPersistenceError>;

    /// Every user with their posts nested, both in storage order.
    async fn list_users_with_posts(&self) -> Result<Vec<UserWithPosts>, AccountPersistenceError>;
}
