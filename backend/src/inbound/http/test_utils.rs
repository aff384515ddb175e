//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;

use crate::domain::assistant::default_registry;
use crate::domain::ports::{AccountCommand, AssistantThread, LoggingAssistantThread, UsersQuery};
use crate::domain::{AccountService, CreatedAccount, Post, PostId, User, UserId, UserWithPosts};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryAccountRepository;

/// Redirect base used by handler tests.
pub const TEST_OAUTH_BASE: &str = "http://localhost:3000";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation, names the cookie `session` and
/// disables the `Secure` flag for plain HTTP.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// State over explicit ports, typically mocks.
pub fn state_with(
    accounts: Arc<dyn AccountCommand>,
    users: Arc<dyn UsersQuery>,
    assistant: Arc<dyn AssistantThread>,
) -> web::Data<HttpState> {
    let registry = default_registry(Arc::clone(&users)).expect("built-in registry");
    web::Data::new(HttpState::new(
        HttpStatePorts {
            accounts,
            users,
            assistant,
        },
        registry,
        TEST_OAUTH_BASE.parse().expect("test base url"),
    ))
}

/// State over a fresh in-memory store.
pub fn in_memory_state() -> web::Data<HttpState> {
    let service = Arc::new(AccountService::new(Arc::new(InMemoryAccountRepository::new())));
    state_with(service.clone(), service, Arc::new(LoggingAssistantThread))
}

/// A created user with id 1 and a published post with id 1.
pub fn created_account(email: &str) -> CreatedAccount {
    CreatedAccount {
        user: User {
            id: UserId::new(1),
            email: email.to_owned(),
            name: Some("Ada".to_owned()),
        },
        post: Some(Post {
            id: PostId::new(1),
            title: "Hello".to_owned(),
            content: None,
            published: true,
            author_id: UserId::new(1),
        }),
    }
}

/// Listing entry matching [`created_account`].
pub fn listed_user(email: &str) -> UserWithPosts {
    let CreatedAccount { user, post } = created_account(email);
    UserWithPosts {
        id: user.id,
        email: user.email,
        name: user.name,
        posts: post.into_iter().collect(),
    }
}
