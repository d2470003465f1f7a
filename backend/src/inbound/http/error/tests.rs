//! Tests for HTTP error mapping.

use super::*;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unprocessable("Required Title"), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(Error::unauthorized("Unauthorized"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("Event not found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("Title Already Taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn render(error: Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ascii header").to_owned());
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, header, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let (status, header, payload) = render(error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(payload.message(), "Internal server error");
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details(expected_trace_id: String) {
    let error = Error::conflict("Title Already Taken")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"field": "title", "code": "duplicate_title"}));

    let (status, header, payload) = render(error).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(payload.code(), ErrorCode::Conflict);
    assert_eq!(payload.message(), "Title Already Taken");
    assert_eq!(
        payload.details(),
        Some(&json!({"field": "title", "code": "duplicate_title"}))
    );
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let (status, header, payload) = render(Error::not_found("Event not found")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(header.is_none());
    assert_eq!(payload.trace_id(), None);
}

#[rstest]
#[case::unauthorized(Error::unauthorized("Unauthorized"), Some(r#"Bearer realm="events""#))]
#[case::not_found(Error::not_found("Event not found"), None)]
#[case::unprocessable(Error::unprocessable("Required Title"), None)]
fn only_unauthorized_responses_carry_a_bearer_challenge(
    #[case] error: Error,
    #[case] expected: Option<&str>,
) {
    let response = ResponseError::error_response(&error);

    let challenge = response
        .headers()
        .get(actix_web::http::header::WWW_AUTHENTICATE)
        .map(|value| value.to_str().expect("ascii header"));
    assert_eq!(challenge, expected);
}

#[rstest]
fn actix_server_errors_become_opaque_internal_errors() {
    let actix_error = actix_web::error::ErrorBadGateway("upstream exploded");
    let error = Error::from(actix_error);
    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "Internal server error");
}

#[rstest]
fn actix_client_errors_stay_invalid_requests() {
    let actix_error = actix_web::error::ErrorBadRequest("query string rejected");
    let error = Error::from(actix_error);
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "query string rejected");
}
