//! Tests for the error payload: construction, trace capture and wire shape.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn conflict() -> Error {
    Error::conflict("User with this email already exists")
}

#[rstest]
#[case(ErrorCode::InvalidRequest, Error::invalid_request("bad"))]
#[case(ErrorCode::NotFound, Error::not_found("missing"))]
#[case(ErrorCode::Conflict, Error::conflict("taken"))]
#[case(ErrorCode::InternalError, Error::internal("boom"))]
fn constructors_set_code(#[case] expected: ErrorCode, #[case] error: Error) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = Error::internal("");
    assert_eq!(error.message(), FALLBACK_MESSAGE);
}

#[rstest]
fn try_with_trace_id_rejects_blank_values(conflict: Error) {
    let result = conflict.try_with_trace_id(" ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[rstest]
fn with_trace_id_ignores_blank_values(conflict: Error) {
    let error = conflict.with_trace_id("");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_message_under_error_key(conflict: Error) {
    let value = serde_json::to_value(conflict.with_trace_id(TRACE_ID)).expect("serialise");
    assert_eq!(
        value,
        json!({
            "error": "User with this email already exists",
            "code": "conflict",
            "traceId": TRACE_ID,
        })
    );
}

#[rstest]
fn omits_absent_optional_fields() {
    let value = serde_json::to_value(Error::invalid_request("Email is required"))
        .expect("serialise");
    let object = value.as_object().expect("object payload");
    assert!(!object.contains_key("traceId"));
    assert!(!object.contains_key("details"));
}

#[rstest]
#[tokio::test]
async fn deserialising_keeps_payload_trace_not_ambient() {
    let ambient = TraceId::generate();
    let decoded: Error = TraceId::scope(ambient, async {
        serde_json::from_value(json!({
            "error": "boom",
            "code": "internal_error",
            "trace_id": TRACE_ID,
        }))
    })
    .await
    .expect("decode");
    assert_eq!(decoded.trace_id(), Some(TRACE_ID));
}

#[rstest]
#[case(json!({"error": "  ", "code": "conflict"}))]
#[case(json!({"error": "taken", "code": "conflict", "traceId": " "}))]
fn deserialising_rejects_invalid_payloads(#[case] payload: serde_json::Value) {
    assert!(serde_json::from_value::<Error>(payload).is_err());
}

#[rstest]
fn details_round_trip_through_builders(conflict: Error) {
    let error = conflict.with_details(json!({ "field": "email" }));
    assert_eq!(error.details(), Some(&json!({ "field": "email" })));
    assert!(error.without_details().details().is_none());
}
