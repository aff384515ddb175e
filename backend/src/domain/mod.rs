//! Domain primitives, use-cases and ports.
//!
//! Purpose: hold the account model and its validation, the services that
//! create and list accounts, and the assistant-facing capabilities. Nothing in
//! here knows about HTTP or SQL; adapters reach the domain through
//! [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Post, UserWithPosts, CreatedAccount: persisted records.
//! - AccountSubmission / NewAccount: raw and validated creation input.
//! - AccountService: implements the account driving ports.
//! - assistant: capability registry, form submission flow, chat panel.

pub mod account;
pub mod account_service;
pub mod assistant;
pub mod auth;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::account::{
    AccountSubmission, AccountValidationError, CreatedAccount, EmailAddress, NewAccount, NewPost,
    NewUser, Post, PostId, PostSubmission, PostTitle, User, UserId, UserWithPosts,
};
pub use self::account_service::{
    AccountCreationError, AccountService, CREATE_FAILED_MESSAGE, DUPLICATE_EMAIL_MESSAGE,
    LIST_FAILED_MESSAGE,
};
pub use self::assistant::ThreadId;
pub use self::auth::{SessionIdentity, resolve_redirect};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use quillboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::conflict("User with this email already exists"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
