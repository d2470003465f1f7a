//! Identity extraction for authenticated endpoints.
//!
//! A caller presents a bearer token either in `Authorization: Bearer <jwt>`
//! or as a `token` query parameter. The header wins when both are present.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";
const TOKEN_QUERY_KEY: &str = "token";

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl Caller {
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.0
    }
}

fn header_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

fn query_token(req: &HttpRequest) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(key, _)| key == TOKEN_QUERY_KEY)
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

/// Extract the bearer token a request presents, if any.
pub(crate) fn request_token(req: &HttpRequest) -> Option<String> {
    header_token(req).or_else(|| query_token(req))
}

fn resolve(req: &HttpRequest) -> Result<Caller, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state not configured"))?;
    let token = request_token(req).ok_or_else(|| Error::unauthorized("Unauthorized"))?;
    state.tokens.verify(&token).map(Caller).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        Error::unauthorized("Unauthorized")
    })
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
