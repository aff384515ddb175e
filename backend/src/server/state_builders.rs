//! Builders wiring storage, services and the registry into [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use crate::domain::AccountService;
use crate::domain::assistant::{RegistryError, default_registry};
use crate::domain::ports::{AccountCommand, AccountRepository, UsersQuery};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::InMemoryAccountRepository;
use crate::outbound::persistence::{DbPool, DieselAccountRepository};

use super::ServerConfig;

/// Pick the database-backed repository when a pool exists, otherwise the
/// in-memory store.
fn select_repository<Pool>(
    pool: Option<&Pool>,
    make_repository: impl FnOnce(&Pool) -> Arc<dyn AccountRepository>,
) -> Arc<dyn AccountRepository> {
    match pool {
        Some(pool) => make_repository(pool),
        None => {
            info!("no database configured; records are kept in memory");
            Arc::new(InMemoryAccountRepository::new())
        }
    }
}

fn account_ports(
    repository: Arc<dyn AccountRepository>,
) -> (Arc<dyn AccountCommand>, Arc<dyn UsersQuery>) {
    let service = Arc::new(AccountService::new(repository));
    (service.clone(), service)
}

fn build_repository(config: &ServerConfig) -> Arc<dyn AccountRepository> {
    select_repository(config.db_pool.as_ref(), |pool: &DbPool| {
        Arc::new(DieselAccountRepository::new(pool.clone()))
    })
}

/// Build the shared HTTP state.
///
/// # Errors
/// [`RegistryError`] when a built-in capability fails registration.
pub(super) fn build_http_state(config: &ServerConfig) -> Result<web::Data<HttpState>, RegistryError> {
    let (accounts, users) = account_ports(build_repository(config));
    let registry = default_registry(Arc::clone(&users))?;
    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            accounts,
            users,
            assistant: Arc::clone(&config.assistant),
        },
        registry,
        config.oauth_base.clone(),
    )))
}
