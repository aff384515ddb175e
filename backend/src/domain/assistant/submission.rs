//! The add-user form flow rendered inside an assistant conversation.
//!
//! [`AddUserForm::validate`] mirrors what the browser checks before
//! submitting. [`SubmissionOrchestrator::submit`] then creates the account,
//! refreshes the listing, notifies the conversation and resets the form.
//! Refresh and notification failures are logged and never undo or mask a
//! successful creation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::ThreadId;
use crate::domain::ports::{AccountCommand, AssistantThread, UsersQuery};
use crate::domain::{
    AccountSubmission, CreatedAccount, EmailAddress, PostSubmission, UserWithPosts,
};

const EMAIL_REQUIRED: &str = "Email is required";
const EMAIL_INVALID: &str = "Please enter a valid email address";
const TITLE_REQUIRED: &str = "Post title is required";

/// Values typed into the form.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AddUserForm {
    /// Email as typed.
    pub email: String,
    /// Display name as typed.
    pub name: String,
    /// Title of the first post.
    pub post_title: String,
    /// Body of the first post.
    pub post_content: String,
    /// Whether the post is published.
    pub published: bool,
}

impl AddUserForm {
    /// Client-side checks, in submission order.
    ///
    /// # Errors
    /// The first failing check's user-facing message.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err(EMAIL_REQUIRED);
        }
        if !EmailAddress::matches_shape(&self.email) {
            return Err(EMAIL_INVALID);
        }
        if self.post_title.trim().is_empty() {
            return Err(TITLE_REQUIRED);
        }
        Ok(())
    }

    /// The request body the form sends. A post is always included.
    #[must_use]
    pub fn to_submission(&self) -> AccountSubmission {
        AccountSubmission {
            email: Some(self.email.trim().to_owned()),
            name: non_blank(&self.name),
            post: Some(PostSubmission {
                title: Some(self.post_title.trim().to_owned()),
                content: non_blank(&self.post_content),
                published: self.published,
            }),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Form contents plus the banner and busy flag shown alongside them.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    /// Current field values.
    pub values: AddUserForm,
    /// Error banner, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True while a submission is in flight.
    pub submitting: bool,
}

impl FormState {
    fn rejected(values: AddUserForm, message: impl Into<String>) -> Self {
        Self {
            values,
            error: Some(message.into()),
            submitting: false,
        }
    }
}

/// What a submission produced.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// The form after the submission settled.
    pub form: FormState,
    /// Created records on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<CreatedAccount>,
    /// Refreshed listing, when the refresh succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserWithPosts>>,
    /// Whether the conversation was told about the new user.
    pub notified: bool,
}

impl SubmissionOutcome {
    fn failed(form: FormState) -> Self {
        Self {
            form,
            created: None,
            users: None,
            notified: false,
        }
    }
}

/// Runs form submissions against the account services.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    accounts: Arc<dyn AccountCommand>,
    users: Arc<dyn UsersQuery>,
    thread: Arc<dyn AssistantThread>,
}

impl SubmissionOrchestrator {
    /// Orchestrator over the given ports.
    pub fn new(
        accounts: Arc<dyn AccountCommand>,
        users: Arc<dyn UsersQuery>,
        thread: Arc<dyn AssistantThread>,
    ) -> Self {
        Self {
            accounts,
            users,
            thread,
        }
    }

    /// Submit `form`; notify `thread` when one is given.
    ///
    /// Validation and creation failures keep the entered values and set the
    /// banner (server messages verbatim). Success returns a cleared form.
    pub async fn submit(&self, thread: Option<&ThreadId>, form: AddUserForm) -> SubmissionOutcome {
        if let Err(message) = form.validate() {
            debug!(message, "add-user form rejected before submission");
            return SubmissionOutcome::failed(FormState::rejected(form, message));
        }

        let created = match self.accounts.create_account(form.to_submission()).await {
            Ok(created) => created,
            Err(err) => {
                return SubmissionOutcome::failed(FormState::rejected(form, err.message()));
            }
        };

        let users = match self.users.list_users().await {
            Ok(users) => Some(users),
            Err(err) => {
                warn!(error = %err.message(), "listing refresh after account creation failed");
                None
            }
        };

        let notified = match thread {
            Some(thread) => self.notify(thread, &created).await,
            None => false,
        };

        SubmissionOutcome {
            form: FormState::default(),
            created: Some(created),
            users,
            notified,
        }
    }

    async fn notify(&self, thread: &ThreadId, created: &CreatedAccount) -> bool {
        match self
            .thread
            .send_message(thread, &success_message(created))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(thread_id = %thread, error = %err, "assistant notification failed");
                false
            }
        }
    }
}

/// Conversation message announcing a created account.
#[must_use]
pub fn success_message(created: &CreatedAccount) -> String {
    let user = &created.user;
    let mut message = format!(
        "Successfully added a new user to the database! User details: Email: {}, Name: {}, User ID: {}.",
        user.email,
        user.name.as_deref().unwrap_or("N/A"),
        user.id,
    );
    if let Some(post) = &created.post {
        message.push_str(&format!(
            " Post details: Title: \"{}\", Published: {}, Post ID: {}.",
            post.title,
            if post.published { "Yes" } else { "No" },
            post.id,
        ));
    }
    message.push_str(" The user table has been updated.");
    message
}
