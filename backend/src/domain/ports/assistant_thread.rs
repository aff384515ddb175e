//! Driven port for posting free-text notes into an assistant conversation.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ThreadId;

use super::define_port_error;

define_port_error! {
    /// Failures delivering a message to the assistant.
    pub enum AssistantThreadError {
        /// The assistant endpoint could not be reached or timed out.
        Transport { message: String } =>
            "assistant thread transport failed: {message}",
        /// The assistant answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "assistant thread rejected message ({status}): {message}",
    }
}

/// Conversation sink for outcome notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantThread: Send + Sync {
    /// Append `text` as a user message to `thread`.
    async fn send_message(&self, thread: &ThreadId, text: &str)
    -> Result<(), AssistantThreadError>;
}

/// Sink used when no assistant endpoint is configured. Messages are logged
/// and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAssistantThread;

#[async_trait]
impl AssistantThread for LoggingAssistantThread {
    async fn send_message(
        &self,
        thread: &ThreadId,
        text: &str,
    ) -> Result<(), AssistantThreadError> {
        info!(thread_id = %thread, message = text, "assistant notification (no endpoint)");
        Ok(())
    }
}
