//! Capabilities shipped with the application.
//!
//! `getUsersData` summarises post counts per user for the `BarChart`
//! component; `AddUserForm` renders the account submission form.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use super::registry::{CapabilityRegistry, ComponentSpec, RegistryError, ToolHandler, ToolSpec};
use crate::domain::ports::UsersQuery;
use crate::domain::{Error, UserWithPosts};

/// Dispatch name of the users summary tool.
pub const USERS_DATA_TOOL: &str = "getUsersData";
/// Render name of the chart component.
pub const BAR_CHART_COMPONENT: &str = "BarChart";
/// Render name of the submission form component.
pub const ADD_USER_FORM_COMPONENT: &str = "AddUserForm";

/// Tools that take no arguments.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoInput {}

/// One chart bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct ChartDatum {
    /// Bar label: the user's name, or their email when unnamed.
    #[serde(rename = "User")]
    pub user: String,
    /// Bar height.
    #[serde(rename = "Posts")]
    pub posts: u32,
}

/// Result of `getUsersData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct UserPostsSummary {
    /// One entry per user, in listing order.
    pub data: Vec<ChartDatum>,
    /// Chart title.
    pub title: String,
    /// Chart subtitle.
    pub description: String,
}

impl UserPostsSummary {
    /// Summarise a user listing.
    #[must_use]
    pub fn from_users(users: &[UserWithPosts]) -> Self {
        Self {
            data: users
                .iter()
                .map(|user| ChartDatum {
                    user: user.display_label().to_owned(),
                    posts: u32::try_from(user.posts.len()).unwrap_or(u32::MAX),
                })
                .collect(),
            title: "User Posts Summary".to_owned(),
            description: "Total posts per user".to_owned(),
        }
    }

    /// Placeholder shown when the listing could not be fetched.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            data: Vec::new(),
            title: "Error".to_owned(),
            description: "Failed to fetch data".to_owned(),
        }
    }
}

/// Props of the `BarChart` component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BarChartProps {
    /// Bars to draw.
    pub data: Vec<ChartDatum>,
    /// Optional heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional subtitle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Props of the `AddUserForm` component; it takes none.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddUserFormProps {}

/// `getUsersData`: post counts per user.
///
/// A failed listing still yields a chart-shaped value so the assistant can
/// render an explanation instead of failing the turn.
pub struct UsersDataTool {
    users: Arc<dyn UsersQuery>,
}

impl UsersDataTool {
    /// Tool reading from `users`.
    pub fn new(users: Arc<dyn UsersQuery>) -> Self {
        Self { users }
    }

    /// Produce the summary.
    pub async fn summarise(&self) -> UserPostsSummary {
        match self.users.list_users().await {
            Ok(users) => UserPostsSummary::from_users(&users),
            Err(err) => {
                warn!(error = %err.message(), "users data tool could not list users");
                UserPostsSummary::unavailable()
            }
        }
    }
}

#[async_trait]
impl ToolHandler for UsersDataTool {
    async fn call(&self, _input: Value) -> Result<Value, Error> {
        serde_json::to_value(self.summarise().await)
            .map_err(|err| Error::internal(format!("failed to encode users summary: {err}")))
    }
}

/// Registry holding every built-in capability.
///
/// # Errors
/// Only if a built-in schema is rejected, which indicates a programming error.
pub fn default_registry(users: Arc<dyn UsersQuery>) -> Result<CapabilityRegistry, RegistryError> {
    let mut registry = CapabilityRegistry::new();
    registry.register_tool(ToolSpec::typed::<NoInput, UserPostsSummary>(
        USERS_DATA_TOOL,
        "Fetch every user with the number of posts they have written",
        Arc::new(UsersDataTool::new(users)),
    ))?;
    registry.register_component(ComponentSpec::typed::<BarChartProps>(
        BAR_CHART_COMPONENT,
        "Bar chart of values per label",
    ))?;
    registry.register_component(ComponentSpec::typed::<AddUserFormProps>(
        ADD_USER_FORM_COMPONENT,
        "Form that creates a user together with their first post",
    ))?;
    Ok(registry)
}
