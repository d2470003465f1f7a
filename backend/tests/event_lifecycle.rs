//! End-to-end event lifecycle over HTTP.
//!
//! Runs the real domain services, JWT adapter and Argon2 hasher against the
//! in-memory store, so ownership, uniqueness and escaping rules are exercised
//! exactly as the server wires them.

use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, LOCATION};
use actix_web::{App, test, web};
use events_backend::domain::ports::TokenIssuer;
use events_backend::domain::{
    CredentialLoginService, EventService, FixtureSet, UserId, load_fixtures,
};
use events_backend::inbound::http::events::{
    EventBody, create_event, delete_event, get_event, list_events, update_event,
};
use events_backend::inbound::http::login::{TokenBody, login};
use events_backend::inbound::http::state::HttpState;
use events_backend::inbound::http::validation::json_config;
use events_backend::middleware::Trace;
use events_backend::outbound::credentials::Argon2CredentialHasher;
use events_backend::outbound::identity::JwtTokenService;
use events_backend::test_support::InMemoryEventStore;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const SECRET: &[u8] = b"lifecycle-test-secret";

struct Harness {
    state: HttpState,
    tokens: Arc<JwtTokenService>,
}

impl Harness {
    fn bearer(&self, user: i64) -> (actix_web::http::header::HeaderName, String) {
        let token = self.tokens.issue(UserId::new(user)).expect("issue token");
        (AUTHORIZATION, format!("Bearer {token}"))
    }
}

#[fixture]
async fn harness() -> Harness {
    let store = InMemoryEventStore::new();
    load_fixtures(
        &store,
        &Argon2CredentialHasher,
        &DefaultClock,
        FixtureSet::standard(),
    )
    .await
    .expect("fixtures load");

    let tokens = Arc::new(JwtTokenService::new(
        SECRET,
        Duration::from_secs(3600),
        Arc::new(DefaultClock),
    ));
    let events = Arc::new(EventService::new(
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
    ));
    let login_service = Arc::new(CredentialLoginService::new(
        Arc::new(store),
        Arc::new(Argon2CredentialHasher),
        tokens.clone(),
    ));
    let state = HttpState::new(events.clone(), events, login_service, tokens.clone());
    Harness { state, tokens }
}

async fn init_app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(json_config())
            .wrap(Trace)
            .service(login)
            .service(create_event)
            .service(list_events)
            .service(get_event)
            .service(update_event)
            .service(delete_event),
    )
    .await
}

#[rstest]
#[actix_web::test]
async fn create_conflict_foreign_update_delete_then_missing(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/events")
            .insert_header(harness.bearer(1))
            .set_json(json!({"title": "T1", "content": "C1", "authorId": 1}))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let location = created
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("location header");
    let body: EventBody = test::read_body_json(created).await;
    assert!(body.id > 0);
    assert_eq!(body.author_id, 1);
    assert_eq!(location, format!("/events/{}", body.id));

    let duplicate = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/events")
            .insert_header(harness.bearer(1))
            .set_json(json!({"title": "T1", "content": "other", "authorId": 1}))
            .to_request(),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let foreign_update = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&location)
            .insert_header(harness.bearer(2))
            .set_json(json!({"title": "Hijacked", "content": "C1", "authorId": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(foreign_update.status(), StatusCode::UNAUTHORIZED);

    let deleted = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&location)
            .insert_header(harness.bearer(1))
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        deleted
            .headers()
            .get("Entity")
            .and_then(|value| value.to_str().ok()),
        Some(body.id.to_string().as_str())
    );

    let missing =
        test::call_service(&app, test::TestRequest::get().uri(&location).to_request()).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn read_one_embeds_the_stored_author(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let res =
        test::call_service(&app, test::TestRequest::get().uri("/events/2").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: EventBody = test::read_body_json(res).await;
    assert_eq!(body.title, "Title 2");
    let author = body.author.expect("author snapshot");
    assert_eq!(author.id, body.author_id);
    assert_eq!(author.display_name, "Martin Luther");
    assert_eq!(author.email, "luther@gmail.com");
}

#[rstest]
#[actix_web::test]
async fn list_returns_fixtures_in_id_order(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let res =
        test::call_service(&app, test::TestRequest::get().uri("/events").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Vec<EventBody> = test::read_body_json(res).await;
    let titles: Vec<_> = body.iter().map(|event| event.title.as_str()).collect();
    assert_eq!(titles, ["Title 1", "Title 2"]);
}

#[rstest]
#[actix_web::test]
async fn markup_is_stored_escaped_once(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/events")
            .insert_header(harness.bearer(1))
            .set_json(json!({"title": "  <b>Bold</b> &amp; co ", "content": "x", "authorId": 1}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: EventBody = test::read_body_json(res).await;
    assert_eq!(body.title, "&lt;b&gt;Bold&lt;/b&gt; &amp; co");
}

#[rstest]
#[actix_web::test]
async fn creating_for_another_author_is_unauthorized(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/events")
            .insert_header(harness.bearer(1))
            .set_json(json!({"title": "Impostor", "content": "x", "authorId": 2}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn validation_failures_are_unprocessable(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/events")
            .insert_header(harness.bearer(1))
            .set_json(json!({"title": "", "content": "x", "authorId": 1}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Required Title");
    assert!(body.get("traceId").and_then(Value::as_str).is_some());
}

#[rstest]
#[actix_web::test]
async fn login_issues_tokens_accepted_by_writes(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let rejected = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"email": "steven@gmail.com", "password": "wrong"}))
            .to_request(),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    let accepted = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"email": "steven@gmail.com", "password": "password"}))
            .to_request(),
    )
    .await;
    assert_eq!(accepted.status(), StatusCode::OK);
    let TokenBody { token } = test::read_body_json(accepted).await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/events")
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .set_json(json!({"title": "Logged in", "content": "C", "authorId": 1}))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
}

#[rstest]
#[case::foreign("/events/2", StatusCode::UNAUTHORIZED)]
#[case::missing("/events/99", StatusCode::NOT_FOUND)]
#[case::owned("/events/1", StatusCode::UNPROCESSABLE_ENTITY)]
#[actix_web::test]
async fn update_reads_the_body_only_after_ownership_is_settled(
    #[future] harness: Harness,
    #[case] uri: &str,
    #[case] expected: StatusCode,
) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(uri)
            .insert_header(harness.bearer(1))
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn invalid_create_without_token_reports_validation(#[future] harness: Harness) {
    let harness = harness.await;
    let app = init_app(harness.state.clone()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/events")
            .set_json(json!({"title": "", "content": "x", "authorId": 1}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
