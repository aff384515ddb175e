//! OpenAPI documentation.
//!
//! [`ApiDoc`] collects every inbound HTTP path and the wire types they
//! exchange. Swagger UI serves it in debug builds and the `openapi-dump`
//! binary prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::assistant::{
    AddUserForm, ChartDatum, ComponentSummary, FormState, PanelEffect, PanelEvent, PanelState,
    RegistrySummary, SubmissionOutcome, ToolSummary, Transition, UserPostsSummary,
};
use crate::domain::{
    CreatedAccount, Error, ErrorCode, Post, SessionIdentity, User, UserWithPosts,
};
use crate::inbound::http::assistant::{PanelEventRequest, PanelEventResponse};
use crate::inbound::http::auth::SessionIdentityRequest;
use crate::inbound::http::users::{CreatePostRequest, CreateUserRequest};

/// Registers the session cookie scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/session. Display only.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Quillboard API",
        description = "Users, their posts and the assistant integration around them.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::auth::create_session,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::auth::delete_session,
        crate::inbound::http::auth::auth_redirect,
        crate::inbound::http::assistant::registry,
        crate::inbound::http::assistant::invoke_tool,
        crate::inbound::http::assistant::check_component_props,
        crate::inbound::http::assistant::submit_add_user_form,
        crate::inbound::http::assistant::panel_event,
        crate::inbound::http::assistant::assistant_context,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Post,
        UserWithPosts,
        CreatedAccount,
        CreateUserRequest,
        CreatePostRequest,
        SessionIdentity,
        SessionIdentityRequest,
        RegistrySummary,
        ToolSummary,
        ComponentSummary,
        ChartDatum,
        UserPostsSummary,
        AddUserForm,
        FormState,
        SubmissionOutcome,
        PanelState,
        PanelEvent,
        PanelEffect,
        Transition,
        PanelEventRequest,
        PanelEventResponse,
    )),
    tags(
        (name = "users", description = "Creating and listing users with their posts"),
        (name = "session", description = "Display identity and sign-in redirects"),
        (name = "assistant", description = "Capabilities and flows used by the assistant"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
