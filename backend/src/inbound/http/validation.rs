//! Shared validation helpers for inbound HTTP adapters.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::domain::{Error, EventId};

/// Parse an event identifier from a path segment.
///
/// Only positive integers name stored events; anything else is a malformed
/// request rather than a missing resource.
pub(crate) fn parse_event_id(raw: &str) -> Result<EventId, Error> {
    raw.parse::<i64>()
        .ok()
        .map(EventId::new)
        .filter(|id| id.get() > 0)
        .ok_or_else(|| {
            Error::invalid_request("id must be a positive integer").with_details(json!({
                "field": "id",
                "value": raw,
                "code": "invalid_id",
            }))
        })
}

fn undecodable(reason: &dyn std::fmt::Display) -> Error {
    debug!(error = %reason, "request body rejected");
    Error::unprocessable("request body could not be decoded")
        .with_details(json!({ "code": "invalid_body", "reason": reason.to_string() }))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    undecodable(&err).into()
}

/// Decode a raw JSON body.
///
/// Handlers that must authorise before reading the body take
/// [`web::Bytes`] and decode here, with the same `422` as [`json_config`].
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|err| undecodable(&err))
}

/// JSON extractor configuration mapping decode failures to `422`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(json_error_handler)
}
