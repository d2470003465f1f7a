//! Event HTTP handlers.
//!
//! ```text
//! POST   /events
//! GET    /events
//! GET    /events/{id}
//! PUT    /events/{id}
//! DELETE /events/{id}
//! ```
//!
//! Reads are public. Writes require a bearer token and are checked against
//! the event's author inside the domain service.
//!
//! Write handlers take the caller and the body as raw extractor results so
//! each gate rejects in a fixed order:
//!
//! - create: decode, validate, caller, author;
//! - update: id, caller, existing author, decode, payload author, validate;
//! - delete: id, caller, existing author.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Event, EventDraft, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{decode_json, parse_event_id};

/// Response header naming the deleted entity.
pub const ENTITY_HEADER: &str = "Entity";

/// Request payload for creating or replacing an event.
///
/// Missing fields decode as empty/zero so the domain validator reports them
/// with its own messages.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(default)]
    #[schema(example = "Title 1")]
    pub title: String,
    #[serde(default)]
    #[schema(example = "Hello world 1")]
    pub content: String,
    #[serde(default)]
    #[schema(example = 1)]
    pub author_id: i64,
}

impl From<EventRequest> for EventDraft {
    fn from(value: EventRequest) -> Self {
        Self {
            title: value.title,
            content: value.content,
            author_id: UserId::new(value.author_id),
        }
    }
}

/// Author snapshot embedded in event responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorBody {
    pub id: i64,
    pub display_name: String,
    pub email: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<&User> for AuthorBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().get(),
            display_name: user.display_name().to_owned(),
            email: user.email().to_owned(),
            created_at: user.created_at().to_rfc3339(),
            updated_at: user.updated_at().to_rfc3339(),
        }
    }
}

/// Event as returned by the REST endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author: Option<AuthorBody>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Event> for EventBody {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.get(),
            author: event.author.as_ref().map(AuthorBody::from),
            title: event.title,
            content: event.content,
            author_id: event.author_id.get(),
            created_at: event.created_at.to_rfc3339(),
            updated_at: event.updated_at.to_rfc3339(),
        }
    }
}

/// Create an event owned by the caller.
#[utoipa::path(
    post,
    path = "/events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventBody,
            headers(("Location" = String, description = "Path of the new event"))),
        (status = 401, description = "Missing token or foreign author", body = ErrorSchema),
        (status = 409, description = "Title already taken", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "createEvent",
    security(("BearerToken" = []))
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    caller: Result<Caller, Error>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let draft: EventDraft = decode_json::<EventRequest>(&body)?.into();
    draft.check()?;
    let caller = caller?;
    let created = state.events.create(caller.user_id(), draft).await?;
    let location = format!("/events/{}", created.id);
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, location))
        .json(EventBody::from(created)))
}

/// List up to 100 events with their authors.
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "Events", body = [EventBody]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "listEvents",
    security([])
)]
#[get("/events")]
pub async fn list_events(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<EventBody>>> {
    let events = state.events_query.list().await?;
    Ok(web::Json(events.into_iter().map(EventBody::from).collect()))
}

/// Fetch one event with its author.
#[utoipa::path(
    get,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event", body = EventBody),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Event not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "getEvent",
    security([])
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventBody>> {
    let id = parse_event_id(&path)?;
    let event = state.events_query.get(id).await?;
    Ok(web::Json(event.into()))
}

/// Replace the title and content of an event the caller owns.
#[utoipa::path(
    put,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Event identifier")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventBody),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Missing token or not the author", body = ErrorSchema),
        (status = 404, description = "Event not found", body = ErrorSchema),
        (status = 409, description = "Title already taken", body = ErrorSchema),
        (status = 422, description = "Validation failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "updateEvent",
    security(("BearerToken" = []))
)]
#[put("/events/{id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    caller: Result<Caller, Error>,
    body: web::Bytes,
) -> ApiResult<web::Json<EventBody>> {
    let id = parse_event_id(&path)?;
    let caller = caller?.user_id();
    state.events.owned(caller, id).await?;
    let draft: EventDraft = decode_json::<EventRequest>(&body)?.into();
    let updated = state.events.update(caller, id, draft).await?;
    Ok(web::Json(updated.into()))
}

/// Delete an event the caller owns.
#[utoipa::path(
    delete,
    path = "/events/{id}",
    params(("id" = i64, Path, description = "Event identifier")),
    responses(
        (status = 204, description = "Event deleted",
            headers(("Entity" = String, description = "Identifier of the deleted event"))),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 401, description = "Missing token or not the author", body = ErrorSchema),
        (status = 404, description = "Event not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "deleteEvent",
    security(("BearerToken" = []))
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    caller: Result<Caller, Error>,
) -> ApiResult<HttpResponse> {
    let id = parse_event_id(&path)?;
    let caller = caller?;
    state.events.delete(caller.user_id(), id).await?;
    Ok(HttpResponse::NoContent()
        .insert_header((ENTITY_HEADER, id.to_string()))
        .finish())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
