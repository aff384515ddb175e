//! Shared application factory for HTTP integration tests.

use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use quillboard::domain::AccountService;
use quillboard::domain::assistant::default_registry;
use quillboard::domain::ports::{AccountRepository, LoggingAssistantThread};
use quillboard::inbound::http::health::HealthState;
use quillboard::inbound::http::state::{HttpState, HttpStatePorts};
use quillboard::outbound::memory::InMemoryAccountRepository;
use quillboard::server::AppDependencies;

/// Redirect base the test application is configured with.
pub const OAUTH_BASE: &str = "http://localhost:3000";

/// Application dependencies over `repository`, with plain-HTTP cookies.
pub fn deps_with(repository: Arc<dyn AccountRepository>) -> AppDependencies {
    let service = Arc::new(AccountService::new(repository));
    let registry = default_registry(service.clone()).expect("built-in registry");
    let http_state = HttpState::new(
        HttpStatePorts {
            accounts: service.clone(),
            users: service,
            assistant: Arc::new(LoggingAssistantThread),
        },
        registry,
        OAUTH_BASE.parse().expect("base url"),
    );
    let health_state = HealthState::new();
    health_state.mark_ready();
    AppDependencies {
        health_state: web::Data::new(health_state),
        http_state: web::Data::new(http_state),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

/// Application dependencies over a fresh in-memory store.
pub fn deps() -> AppDependencies {
    deps_with(Arc::new(InMemoryAccountRepository::new()))
}
