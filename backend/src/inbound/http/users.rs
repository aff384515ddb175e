//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users {"email":"ada@example.com","name":"Ada","post":{"title":"Hello"}}
//! GET /api/v1/users
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{AccountSubmission, CreatedAccount, Error, PostSubmission, UserWithPosts};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Post portion of `POST /api/v1/users`.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreatePostRequest {
    /// Required, non-blank once trimmed.
    #[schema(value_type = String, example = "Hello")]
    pub title: Option<Value>,
    /// Optional body; blank means absent.
    #[schema(value_type = Option<String>)]
    pub content: Option<Value>,
    /// Only the JSON literal `true` publishes.
    #[schema(value_type = Option<bool>)]
    pub published: Option<Value>,
}

/// Request body for `POST /api/v1/users`.
///
/// Fields are accepted loosely: values of the wrong JSON type are treated as
/// missing so the domain reports them with its usual validation messages.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    /// Required email address.
    #[serde(default)]
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: Option<Value>,
    /// Optional display name.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Ada")]
    pub name: Option<Value>,
    /// Optional first post.
    #[serde(default)]
    #[schema(value_type = Option<CreatePostRequest>)]
    pub post: Option<Value>,
}

fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    }
}

fn post_submission(fields: &Map<String, Value>) -> PostSubmission {
    PostSubmission {
        title: text(fields.get("title")),
        content: text(fields.get("content")),
        published: matches!(fields.get("published"), Some(Value::Bool(true))),
    }
}

/// `false`, `0`, `""` and `null` mean "no post"; any other non-object value
/// is a post without a title.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl From<CreateUserRequest> for AccountSubmission {
    fn from(value: CreateUserRequest) -> Self {
        let post = match value.post {
            Some(Value::Object(fields)) => Some(post_submission(&fields)),
            Some(other) if is_truthy(&other) => Some(PostSubmission::default()),
            _ => None,
        };
        Self {
            email: text(value.email.as_ref()),
            name: text(value.name.as_ref()),
            post,
        }
    }
}

/// Create a user and, optionally, their first post in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreatedAccount),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let created = state
        .accounts
        .create_account(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(created))
}

/// List every user with their posts.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use quillboard::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users with their posts", body = [UserWithPosts]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserWithPosts>>> {
    let users = state.users.list_users().await?;
    Ok(web::Json(users))
}
