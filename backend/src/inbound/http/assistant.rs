//! Assistant-facing endpoints.
//!
//! ```text
//! GET  /api/v1/assistant/registry
//! POST /api/v1/assistant/tools/{name}
//! POST /api/v1/assistant/components/{name}/props
//! POST /api/v1/assistant/threads/{threadId}/add-user-form
//! POST /api/v1/assistant/panel/events
//! GET  /api/v1/assistant/context
//! ```

use actix_web::{HttpRequest, HttpResponse, get, http::header, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::assistant::{
    AddUserForm, ChatPanel, PanelEvent, PanelState, Platform, RegistrySummary, SubmissionOutcome,
    Transition,
};
use crate::domain::{Error, SessionIdentity, ThreadId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Tools and components the assistant may use, with their schemas.
#[utoipa::path(
    get,
    path = "/api/v1/assistant/registry",
    responses((status = 200, description = "Registered capabilities", body = RegistrySummary)),
    tags = ["assistant"],
    operation_id = "assistantRegistry"
)]
#[get("/assistant/registry")]
pub async fn registry(state: web::Data<HttpState>) -> web::Json<RegistrySummary> {
    web::Json(state.registry.summary())
}

/// Invoke a registered tool.
#[utoipa::path(
    post,
    path = "/api/v1/assistant/tools/{name}",
    params(("name" = String, Path, description = "Tool name")),
    request_body(content = Object, description = "Tool input"),
    responses(
        (status = 200, description = "Tool output", body = Object),
        (status = 400, description = "Input does not match the tool schema", body = Error),
        (status = 404, description = "Unknown tool", body = Error),
        (status = 500, description = "Tool failed", body = Error)
    ),
    tags = ["assistant"],
    operation_id = "invokeTool"
)]
#[post("/assistant/tools/{name}")]
pub async fn invoke_tool(
    state: web::Data<HttpState>,
    name: web::Path<String>,
    input: web::Json<Value>,
) -> ApiResult<web::Json<Value>> {
    let output = state
        .registry
        .invoke(&name.into_inner(), input.into_inner())
        .await?;
    Ok(web::Json(output))
}

/// Check props the assistant proposes for a component.
#[utoipa::path(
    post,
    path = "/api/v1/assistant/components/{name}/props",
    params(("name" = String, Path, description = "Component name")),
    request_body(content = Object, description = "Proposed props"),
    responses(
        (status = 204, description = "Props are valid"),
        (status = 400, description = "Props do not match the component schema", body = Error),
        (status = 404, description = "Unknown component", body = Error)
    ),
    tags = ["assistant"],
    operation_id = "checkComponentProps"
)]
#[post("/assistant/components/{name}/props")]
pub async fn check_component_props(
    state: web::Data<HttpState>,
    name: web::Path<String>,
    props: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    state.registry.check_props(&name, &props)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Submit the add-user form rendered in a conversation.
///
/// Always answers 200: validation and server failures come back in
/// `form.error` with the submitted values kept.
#[utoipa::path(
    post,
    path = "/api/v1/assistant/threads/{threadId}/add-user-form",
    params(("threadId" = String, Path, description = "Conversation thread")),
    request_body = AddUserForm,
    responses(
        (status = 200, description = "Form state after submission", body = SubmissionOutcome),
        (status = 400, description = "Invalid thread id", body = Error)
    ),
    tags = ["assistant"],
    operation_id = "submitAddUserForm"
)]
#[post("/assistant/threads/{thread_id}/add-user-form")]
pub async fn submit_add_user_form(
    state: web::Data<HttpState>,
    thread_id: web::Path<String>,
    form: web::Json<AddUserForm>,
) -> ApiResult<web::Json<SubmissionOutcome>> {
    let thread = ThreadId::parse(&thread_id).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "threadId" }))
    })?;
    let outcome = state
        .submissions
        .submit(Some(&thread), form.into_inner())
        .await;
    Ok(web::Json(outcome))
}

/// Input for the panel state machine: either a key press or an explicit
/// event such as the close button.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PanelEventRequest {
    /// Current panel state.
    #[serde(default)]
    pub state: PanelState,
    /// Explicit event; takes precedence over `key`.
    #[serde(default)]
    pub event: Option<PanelEvent>,
    /// DOM `KeyboardEvent.key`.
    #[serde(default)]
    pub key: Option<String>,
    /// Meta (⌘) held.
    #[serde(default)]
    pub meta: bool,
    /// Control held.
    #[serde(default)]
    pub ctrl: bool,
}

/// Outcome of a panel event.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PanelEventResponse {
    /// Resulting state and effect.
    pub transition: Transition,
    /// Header text for the resulting state.
    pub header_label: &'static str,
    /// Shortcut hint for the caller's platform.
    pub shortcut_label: &'static str,
}

/// Run one event through the chat panel state machine.
#[utoipa::path(
    post,
    path = "/api/v1/assistant/panel/events",
    request_body = PanelEventRequest,
    responses(
        (status = 200, description = "Transition", body = PanelEventResponse),
        (status = 400, description = "Neither event nor key supplied", body = Error)
    ),
    tags = ["assistant"],
    operation_id = "panelEvent"
)]
#[post("/assistant/panel/events")]
pub async fn panel_event(
    req: HttpRequest,
    payload: web::Json<PanelEventRequest>,
) -> ApiResult<web::Json<PanelEventResponse>> {
    let request = payload.into_inner();
    let mut panel = ChatPanel::new(request.state);
    let transition = match (request.event, request.key.as_deref()) {
        (Some(event), _) => panel.handle(event),
        (None, Some(key)) => panel.handle_key(key, request.meta, request.ctrl),
        (None, None) => return Err(Error::invalid_request("Either event or key is required")),
    };
    let platform = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map_or(Platform::Other, Platform::from_user_agent);
    Ok(web::Json(PanelEventResponse {
        transition,
        header_label: panel.header_label(),
        shortcut_label: platform.shortcut_label(),
    }))
}

/// The signed-in user as the assistant sees it, or `null`.
#[utoipa::path(
    get,
    path = "/api/v1/assistant/context",
    responses((status = 200, description = "Session user", body = Option<SessionIdentity>)),
    tags = ["assistant"],
    operation_id = "assistantContext"
)]
#[get("/assistant/context")]
pub async fn assistant_context(session: SessionContext) -> web::Json<Option<SessionIdentity>> {
    web::Json(session.identity())
}

#[cfg(test)]
#[path = "assistant_tests.rs"]
mod tests;
