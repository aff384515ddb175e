//! Outbound adapters for the assistant service.

mod http_thread;

pub use http_thread::HttpAssistantThread;
