//! HTTP mapping for domain errors.
//!
//! The domain [`Error`] stays transport-agnostic; this module picks the
//! status code, mirrors the trace id into a header and strips `details` from
//! internal errors before they leave the process.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error};

pub use crate::domain::ApiResult;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Message for request bodies that are not valid JSON.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON body";
/// Message for request bodies sent with a non-JSON content type.
pub const UNSUPPORTED_CONTENT_TYPE_MESSAGE: &str = "Content-Type must be application/json";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::InternalError {
            builder.json(self.clone().without_details())
        } else {
            builder.json(self)
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

/// `JsonConfig` error handler producing the standard error body.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected request body");
    let message = match err {
        JsonPayloadError::ContentType => UNSUPPORTED_CONTENT_TYPE_MESSAGE,
        _ => INVALID_JSON_MESSAGE,
    };
    Error::invalid_request(message).into()
}
