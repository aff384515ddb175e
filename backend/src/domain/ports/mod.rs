//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`AccountCommand`], [`UsersQuery`]) are what inbound
//! adapters call. Driven ports ([`AccountRepository`], [`AssistantThread`])
//! are what outbound adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod assistant_thread;
mod users_query;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountPersistenceError, AccountRepository, AccountTransaction};
#[cfg(test)]
pub use assistant_thread::MockAssistantThread;
pub use assistant_thread::{AssistantThread, AssistantThreadError, LoggingAssistantThread};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
