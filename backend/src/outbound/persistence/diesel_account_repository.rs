//! PostgreSQL-backed [`AccountRepository`].
//!
//! [`DieselAccountRepository::begin`] checks out an owned connection and
//! opens a transaction on it through `diesel-async`'s transaction manager.
//! The returned guard issues `COMMIT` or `ROLLBACK` when asked; if it is
//! dropped while still open, the rollback is spawned on the current Tokio
//! runtime before the connection returns to the pool.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{
    AnsiTransactionManager, AsyncConnection as _, AsyncPgConnection, RunQueryDsl,
    TransactionManager,
};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPostRow, NewUserRow, PostRow, UserRow};
use super::pool::DbPool;
use super::schema::{posts, users};
use crate::domain::ports::{AccountPersistenceError, AccountRepository, AccountTransaction};
use crate::domain::{EmailAddress, NewPost, NewUser, Post, User, UserId, UserWithPosts};

type OwnedConnection = PooledConnection<'static, AsyncPgConnection>;

/// Diesel implementation of the account storage port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Repository over `pool`.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(User::from))
    }

    async fn begin(&self) -> Result<Box<dyn AccountTransaction>, AccountPersistenceError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselAccountTransaction { conn: Some(conn) }))
    }

    async fn list_users_with_posts(&self) -> Result<Vec<UserWithPosts>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // One snapshot for both reads so posts never reference unseen users.
        let (user_rows, post_rows) = conn
            .transaction(|conn| {
                async move {
                    let user_rows: Vec<UserRow> = users::table
                        .select(UserRow::as_select())
                        .order_by(users::id)
                        .load(conn)
                        .await?;
                    let post_rows: Vec<PostRow> = PostRow::belonging_to(&user_rows)
                        .select(PostRow::as_select())
                        .order_by(posts::id)
                        .load(conn)
                        .await?;
                    Ok((user_rows, post_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let grouped = post_rows.grouped_by(&user_rows);
        Ok(user_rows
            .into_iter()
            .zip(grouped)
            .map(|(user, posts)| UserWithPosts {
                id: UserId::new(user.id),
                email: user.email,
                name: user.name,
                posts: posts.into_iter().map(Post::from).collect(),
            })
            .collect())
    }
}

/// Open transaction on a dedicated pooled connection.
struct DieselAccountTransaction {
    conn: Option<OwnedConnection>,
}

impl DieselAccountTransaction {
    fn connection(&mut self) -> Result<&mut OwnedConnection, AccountPersistenceError> {
        self.conn
            .as_mut()
            .ok_or_else(|| AccountPersistenceError::connection("transaction already finished"))
    }

    fn take(&mut self) -> Result<OwnedConnection, AccountPersistenceError> {
        self.conn
            .take()
            .ok_or_else(|| AccountPersistenceError::connection("transaction already finished"))
    }
}

#[async_trait]
impl AccountTransaction for DieselAccountTransaction {
    async fn create_user(&mut self, user: &NewUser) -> Result<User, AccountPersistenceError> {
        let conn = self.connection()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                email: user.email.as_ref(),
                name: user.name.as_deref(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut **conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(User::from(row))
    }

    async fn create_post(
        &mut self,
        author: UserId,
        post: &NewPost,
    ) -> Result<Post, AccountPersistenceError> {
        let conn = self.connection()?;
        let row = diesel::insert_into(posts::table)
            .values(&NewPostRow {
                title: post.title.as_ref(),
                content: post.content.as_deref(),
                published: post.published,
                author_id: author.get(),
            })
            .returning(PostRow::as_returning())
            .get_result(&mut **conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Post::from(row))
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AccountPersistenceError> {
        let mut conn = self.take()?;
        AnsiTransactionManager::commit_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), AccountPersistenceError> {
        let mut conn = self.take()?;
        AnsiTransactionManager::rollback_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)
    }
}

impl Drop for DieselAccountTransaction {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                debug!("rolling back abandoned account transaction");
                handle.spawn(async move {
                    if let Err(err) = AnsiTransactionManager::rollback_transaction(&mut *conn).await
                    {
                        warn!(error = %err, "rollback of abandoned account transaction failed");
                    }
                });
            }
            Err(_) => {
                warn!("account transaction dropped outside a Tokio runtime; connection discarded");
                // The pool treats a connection with an open transaction as
                // broken and closes it; PostgreSQL then aborts the transaction.
                drop(conn);
            }
        }
    }
}
