//! Shared HTTP adapter state.
//!
//! Handlers take this state via `actix_web::web::Data` so they depend only on
//! domain ports and stay testable without I/O.

use std::sync::Arc;

use url::Url;

use crate::domain::assistant::{CapabilityRegistry, SubmissionOrchestrator};
use crate::domain::ports::{AccountCommand, AssistantThread, UsersQuery};

/// Parameter object bundling the port implementations handlers call.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Account creation use-case.
    pub accounts: Arc<dyn AccountCommand>,
    /// Listing use-case.
    pub users: Arc<dyn UsersQuery>,
    /// Conversation the add-user form reports back to.
    pub assistant: Arc<dyn AssistantThread>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account creation use-case.
    pub accounts: Arc<dyn AccountCommand>,
    /// Listing use-case.
    pub users: Arc<dyn UsersQuery>,
    /// Tools and components the assistant may use.
    pub registry: Arc<CapabilityRegistry>,
    /// Add-user form flow.
    pub submissions: SubmissionOrchestrator,
    /// Base URL sign-in redirects resolve against.
    pub oauth_base: Url,
}

impl HttpState {
    /// Assemble state from ports, the registry and the redirect base.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use quillboard::domain::assistant::default_registry;
    /// use quillboard::domain::ports::LoggingAssistantThread;
    /// use quillboard::domain::AccountService;
    /// use quillboard::inbound::http::state::{HttpState, HttpStatePorts};
    /// use quillboard::outbound::memory::InMemoryAccountRepository;
    ///
    /// let service = Arc::new(AccountService::new(Arc::new(InMemoryAccountRepository::default())));
    /// let registry = default_registry(service.clone()).expect("built-in registry");
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         accounts: service.clone(),
    ///         users: service,
    ///         assistant: Arc::new(LoggingAssistantThread),
    ///     },
    ///     registry,
    ///     "http://localhost:3000".parse().expect("url"),
    /// );
    /// assert_eq!(state.registry.summary().tools.len(), 1);
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts, registry: CapabilityRegistry, oauth_base: Url) -> Self {
        let HttpStatePorts {
            accounts,
            users,
            assistant,
        } = ports;
        let submissions =
            SubmissionOrchestrator::new(Arc::clone(&accounts), Arc::clone(&users), assistant);
        Self {
            accounts,
            users,
            registry: Arc::new(registry),
            submissions,
            oauth_base,
        }
    }
}
