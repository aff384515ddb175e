//! Driving port for the read side: every user with their posts.

use async_trait::async_trait;

use crate::domain::{Error, UserWithPosts};

/// Use-case port listing users and their posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// All users in storage order, each with their posts nested. No paging.
    async fn list_users(&self) -> Result<Vec<UserWithPosts>, Error>;
}
