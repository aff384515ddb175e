//! Request middleware.
//!
//! Only request tracing lives here; sessions come from `actix-session`.

pub mod trace;

pub use trace::Trace;
