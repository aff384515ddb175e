//! Process-local account store.
//!
//! Used when no database is configured and by tests. It keeps the storage
//! contract of the PostgreSQL adapter: identifiers come from monotonically
//! increasing sequences (gaps after rollbacks included), writes are staged per
//! transaction and applied at commit, and the unique-email rule is enforced on
//! insert and again at commit so a racing duplicate surfaces as
//! [`AccountPersistenceError::UniqueViolation`].

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{AccountPersistenceError, AccountRepository, AccountTransaction};
use crate::domain::{
    EmailAddress, NewPost, NewUser, Post, PostId, User, UserId, UserWithPosts,
};

#[derive(Debug, Default)]
struct Store {
    users: Vec<User>,
    posts: Vec<Post>,
    last_user_id: i32,
    last_post_id: i32,
}

impl Store {
    fn next_user_id(&mut self) -> UserId {
        self.last_user_id += 1;
        UserId::new(self.last_user_id)
    }

    fn next_post_id(&mut self) -> PostId {
        self.last_post_id += 1;
        PostId::new(self.last_post_id)
    }

    fn has_email(&self, email: &str) -> bool {
        self.users.iter().any(|user| user.email == email)
    }

    fn has_user(&self, id: UserId) -> bool {
        self.users.iter().any(|user| user.id == id)
    }
}

fn lock(store: &Mutex<Store>) -> Result<MutexGuard<'_, Store>, AccountPersistenceError> {
    store
        .lock()
        .map_err(|_| AccountPersistenceError::query("account store lock poisoned"))
}

fn duplicate(email: &str) -> AccountPersistenceError {
    AccountPersistenceError::unique_violation(format!("users.email = {email}"))
}

/// In-memory [`AccountRepository`]. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryAccountRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountPersistenceError> {
        let store = lock(&self.store)?;
        Ok(store
            .users
            .iter()
            .find(|user| user.email == email.as_ref())
            .cloned())
    }

    async fn begin(&self) -> Result<Box<dyn AccountTransaction>, AccountPersistenceError> {
        Ok(Box::new(InMemoryTransaction {
            store: Arc::clone(&self.store),
            users: Vec::new(),
            posts: Vec::new(),
            finished: false,
        }))
    }

    async fn list_users_with_posts(&self) -> Result<Vec<UserWithPosts>, AccountPersistenceError> {
        let store = lock(&self.store)?;
        Ok(store
            .users
            .iter()
            .map(|user| UserWithPosts {
                id: user.id,
                email: user.email.clone(),
                name: user.name.clone(),
                posts: store
                    .posts
                    .iter()
                    .filter(|post| post.author_id == user.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }
}

struct InMemoryTransaction {
    store: Arc<Mutex<Store>>,
    users: Vec<User>,
    posts: Vec<Post>,
    finished: bool,
}

#[async_trait]
impl AccountTransaction for InMemoryTransaction {
    async fn create_user(&mut self, user: &NewUser) -> Result<User, AccountPersistenceError> {
        let email = user.email.as_ref();
        let mut store = lock(&self.store)?;
        if store.has_email(email) || self.users.iter().any(|staged| staged.email == email) {
            return Err(duplicate(email));
        }
        let created = User {
            id: store.next_user_id(),
            email: email.to_owned(),
            name: user.name.clone(),
        };
        drop(store);
        self.users.push(created.clone());
        Ok(created)
    }

    async fn create_post(
        &mut self,
        author: UserId,
        post: &NewPost,
    ) -> Result<Post, AccountPersistenceError> {
        let mut store = lock(&self.store)?;
        if !store.has_user(author) && !self.users.iter().any(|user| user.id == author) {
            return Err(AccountPersistenceError::query(format!(
                "posts.author_id = {author} references no user"
            )));
        }
        let created = Post {
            id: store.next_post_id(),
            title: post.title.as_ref().to_owned(),
            content: post.content.clone(),
            published: post.published,
            author_id: author,
        };
        drop(store);
        self.posts.push(created.clone());
        Ok(created)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AccountPersistenceError> {
        self.finished = true;
        let mut store = lock(&self.store)?;
        if let Some(user) = self.users.iter().find(|user| store.has_email(&user.email)) {
            return Err(duplicate(&user.email));
        }
        store.users.append(&mut self.users);
        store.posts.append(&mut self.posts);
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), AccountPersistenceError> {
        self.finished = true;
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.finished && !(self.users.is_empty() && self.posts.is_empty()) {
            debug!(
                users = self.users.len(),
                posts = self.posts.len(),
                "discarding uncommitted account writes"
            );
        }
    }
}
