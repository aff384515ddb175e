//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL account storage through Diesel.
//! - **memory**: process-local account storage used without a database.
//! - **assistant**: HTTP delivery of conversation messages.
//!
//! Adapters translate between domain types and infrastructure
//! representations and carry no business rules.

pub mod assistant;
pub mod memory;
pub mod persistence;
