//! Session identity endpoints and the post sign-in redirect.
//!
//! Tokens are issued elsewhere; these handlers only remember who the provider
//! said the caller is, for display, and decide where to send the browser.

use actix_web::{HttpResponse, delete, get, http::header, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{AccountValidationError, Error, SessionIdentity, resolve_redirect};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Identity supplied by the OAuth provider.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SessionIdentityRequest {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email; must look like `local@domain.tld`.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Query string of the redirect endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RedirectQuery {
    /// Requested destination, relative or absolute.
    pub url: Option<String>,
}

fn map_identity_error(err: AccountValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": err.code() }))
}

/// Remember the signed-in identity.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    request_body = SessionIdentityRequest,
    responses(
        (status = 200, description = "Identity stored", body = SessionIdentity,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid identity", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["session"],
    operation_id = "createSession"
)]
#[post("/session")]
pub async fn create_session(
    session: SessionContext,
    payload: web::Json<SessionIdentityRequest>,
) -> ApiResult<web::Json<SessionIdentity>> {
    let SessionIdentityRequest { name, email, image } = payload.into_inner();
    let identity = SessionIdentity::new(name.as_deref(), &email, image.as_deref())
        .map_err(map_identity_error)?;
    session.persist_identity(&identity)?;
    Ok(web::Json(identity))
}

/// The stored identity, or `null`.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses((status = 200, description = "Current identity", body = Option<SessionIdentity>)),
    tags = ["session"],
    operation_id = "currentSession"
)]
#[get("/session")]
pub async fn current_session(session: SessionContext) -> web::Json<Option<SessionIdentity>> {
    web::Json(session.identity())
}

/// Forget the stored identity.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses((status = 204, description = "Session cleared")),
    tags = ["session"],
    operation_id = "deleteSession"
)]
#[delete("/session")]
pub async fn delete_session(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Redirect after sign-in, confined to the application's own origin.
#[utoipa::path(
    get,
    path = "/api/v1/auth/redirect",
    params(RedirectQuery),
    responses((status = 302, description = "Redirect",
        headers(("Location" = String, description = "Resolved destination")))),
    tags = ["session"],
    operation_id = "authRedirect"
)]
#[get("/auth/redirect")]
pub async fn auth_redirect(
    state: web::Data<HttpState>,
    query: web::Query<RedirectQuery>,
) -> HttpResponse {
    let target = query.url.as_deref().unwrap_or_default();
    let location = resolve_redirect(&state.oauth_base, target);
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_str()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{in_memory_state, test_session_middleware};
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    macro_rules! app {
        () => {
            actix_test::init_service(
                App::new()
                    .app_data(in_memory_state())
                    .wrap(test_session_middleware())
                    .service(
                        web::scope("/api/v1")
                            .service(create_session)
                            .service(current_session)
                            .service(delete_session)
                            .service(auth_redirect),
                    ),
            )
            .await
        };
    }

    fn cookie(res: &ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn stored_identity_is_returned_until_cleared() {
        let app = app!();
        let created = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/session")
                .set_json(json!({ "name": " Ada ", "email": "ada@example.com", "image": "" }))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::OK);
        let session = cookie(&created);

        let current: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/session")
                .cookie(session.clone())
                .to_request(),
        )
        .await;
        assert_eq!(current, json!({ "name": "Ada", "email": "ada@example.com", "image": null }));

        let cleared = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/v1/session")
                .cookie(session)
                .to_request(),
        )
        .await;
        assert_eq!(cleared.status(), StatusCode::NO_CONTENT);
        let removal = cookie(&cleared);

        let after: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/session")
                .cookie(removal)
                .to_request(),
        )
        .await;
        assert_eq!(after, Value::Null);
    }

    #[actix_web::test]
    async fn malformed_email_is_rejected() {
        let app = app!();
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/session")
                .set_json(json!({ "email": "not-an-email" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["error"], "Invalid email format");
    }

    #[rstest]
    #[case("/api/v1/auth/redirect?url=%2Fsettings", "http://localhost:3000/settings")]
    #[case(
        "/api/v1/auth/redirect?url=http%3A%2F%2Flocalhost%3A3000%2Fboard",
        "http://localhost:3000/board"
    )]
    #[case(
        "/api/v1/auth/redirect?url=https%3A%2F%2Fevil.example%2F",
        "http://localhost:3000/dashboard"
    )]
    #[case("/api/v1/auth/redirect", "http://localhost:3000/dashboard")]
    #[actix_web::test]
    async fn redirect_stays_on_origin(#[case] uri: &str, #[case] location: &str) {
        let app = app!();
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some(location)
        );
    }
}
