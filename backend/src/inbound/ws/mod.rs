//! WebSocket inbound adapter serving the event streaming RPC.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured origin allow-list
//! - hand the upgraded socket to a per-connection session task
//!
//! Non-browser clients send no `Origin` header and are accepted; browsers
//! must present an allow-listed origin.

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, warn};
use url::Url;

mod session;

pub mod messages;
pub mod state;

use state::AllowedOrigins;

/// Upgrade `GET /rpc/events` to a WebSocket.
#[get("/rpc/events")]
pub async fn rpc_entry(
    state: web::Data<state::WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    if let Some(origin_header) = origin_iter.next() {
        if origin_iter.next().is_some() {
            error!("Multiple Origin headers on RPC upgrade");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
        validate_origin(&state.allowed_origins, origin_header)?;
    }

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "RPC upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;
    actix_web::rt::spawn(session::handle_rpc_session(
        state.events.clone(),
        session,
        messages,
    ));
    Ok(response)
}

fn validate_origin(allowed: &AllowedOrigins, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if allowed.permits(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected RPC upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}
