//! Domain errors rendered as JSON responses.
//!
//! The body is the serialised [`Error`] with internal messages redacted. A
//! trace id, when present, is echoed in the `trace-id` header, and 401
//! responses carry a `WWW-Authenticate: Bearer` challenge for the token
//! gate.

use actix_web::http::header::{HeaderValue, WWW_AUTHENTICATE};
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError, http::StatusCode};
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for event and login handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Bearer challenge sent with every 401.
const BEARER_CHALLENGE: &str = r#"Bearer realm="events""#;
const REDACTED: &str = "Internal server error";

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wire body for `error`. Internal failures keep only their trace id.
fn wire_body(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

fn log_rejection(error: &Error, status: StatusCode) {
    if status.is_server_error() {
        error!(
            status = status.as_u16(),
            code = error.code().as_str(),
            message = error.message(),
            trace_id = ?error.trace_id(),
            "request failed"
        );
    } else {
        debug!(
            status = status.as_u16(),
            code = error.code().as_str(),
            trace_id = ?error.trace_id(),
            "request rejected"
        );
    }
}

fn with_headers(builder: &mut HttpResponseBuilder, error: &Error) {
    if let Some(id) = error.trace_id() {
        builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
    }
    if error.code() == ErrorCode::Unauthorized {
        builder.insert_header((WWW_AUTHENTICATE, HeaderValue::from_static(BEARER_CHALLENGE)));
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        log_rejection(self, status);
        let mut builder = HttpResponse::build(status);
        with_headers(&mut builder, self);
        builder.json(wire_body(self))
    }
}

/// Actix client errors (4xx) keep their message as an invalid request;
/// anything else becomes an opaque internal error.
impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        if status.is_client_error() {
            return Error::invalid_request(err.to_string());
        }
        error!(error = %err, status = status.as_u16(), "actix error promoted to domain error");
        Error::internal(REDACTED)
    }
}

#[cfg(test)]
mod tests;
