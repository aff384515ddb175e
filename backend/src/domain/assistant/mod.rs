//! Assistant integration: the capability registry the assistant dispatches
//! through, the add-user form flow it renders, and the chat panel model.

pub mod builtins;
pub mod panel;
pub mod registry;
pub mod submission;

use std::fmt;

pub use builtins::{
    ADD_USER_FORM_COMPONENT, AddUserFormProps, BAR_CHART_COMPONENT, BarChartProps, ChartDatum,
    NoInput, USERS_DATA_TOOL, UserPostsSummary, UsersDataTool, default_registry,
};
pub use panel::{ChatPanel, PanelEffect, PanelEvent, PanelState, Platform, Transition};
pub use registry::{
    CapabilityRegistry, ComponentSpec, ComponentSummary, RegistryError, RegistrySummary,
    ToolHandler, ToolSpec, ToolSummary,
};
pub use submission::{
    AddUserForm, FormState, SubmissionOrchestrator, SubmissionOutcome, success_message,
};

const THREAD_ID_MAX: usize = 128;

/// Reasons a conversation identifier is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThreadIdError {
    /// Blank input.
    #[error("thread id must not be empty")]
    Empty,
    /// Contains whitespace or control characters.
    #[error("thread id must not contain whitespace")]
    InvalidCharacters,
    /// Longer than the accepted maximum.
    #[error("thread id must be at most {max} characters")]
    TooLong {
        /// Accepted maximum.
        max: usize,
    },
}

/// Identifier of an assistant conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    /// Validate a raw identifier. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// See [`ThreadIdError`].
    pub fn parse(raw: &str) -> Result<Self, ThreadIdError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ThreadIdError::Empty);
        }
        if value
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control())
        {
            return Err(ThreadIdError::InvalidCharacters);
        }
        if value.chars().count() > THREAD_ID_MAX {
            return Err(ThreadIdError::TooLong {
                max: THREAD_ID_MAX,
            });
        }
        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
