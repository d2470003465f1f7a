//! Credential exchange.
//!
//! ```text
//! POST /login {"email":"steven@gmail.com","password":"password"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "steven@gmail.com")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
}

/// Bearer token issued on successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TokenBody {
    pub token: String,
}

fn require_field(field: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(
            Error::unprocessable(format!("{field} must not be empty")).with_details(json!({
                "field": field,
                "code": format!("empty_{field}"),
            })),
        );
    }
    Ok(())
}

/// Exchange an email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenBody),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 422, description = "Malformed body", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenBody>> {
    let LoginRequest { email, password } = payload.into_inner();
    require_field("email", &email)?;
    require_field("password", &password)?;
    let token = state.login.login(&email, &password).await?;
    Ok(web::Json(TokenBody { token }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{
        MockEventCommand, MockEventQuery, MockLoginService, MockTokenVerifier,
    };
    use crate::inbound::http::validation::json_config;

    async fn post_login(login_service: MockLoginService, body: Value) -> actix_web::dev::ServiceResponse {
        let state = HttpState::new(
            Arc::new(MockEventCommand::new()),
            Arc::new(MockEventQuery::new()),
            Arc::new(login_service),
            Arc::new(MockTokenVerifier::new()),
        );
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(json_config())
                .service(login),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/login")
            .set_json(body)
            .to_request();
        actix_test::call_service(&app, req).await
    }

    #[rstest]
    #[actix_web::test]
    async fn issues_a_token() {
        let mut service = MockLoginService::new();
        service
            .expect_login()
            .withf(|email, password| email == "steven@gmail.com" && password == "password")
            .times(1)
            .return_once(|_, _| Ok("signed".to_owned()));

        let res = post_login(
            service,
            json!({"email": "steven@gmail.com", "password": "password"}),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: TokenBody = actix_test::read_body_json(res).await;
        assert_eq!(body.token, "signed");
    }

    #[rstest]
    #[actix_web::test]
    async fn rejected_credentials_are_401() {
        let mut service = MockLoginService::new();
        service
            .expect_login()
            .return_once(|_, _| Err(Error::unauthorized("invalid credentials")));

        let res = post_login(
            service,
            json!({"email": "steven@gmail.com", "password": "wrong"}),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "invalid credentials");
    }

    #[rstest]
    #[case::missing_password(json!({"email": "steven@gmail.com"}), "invalid_body")]
    #[case::blank_email(json!({"email": " ", "password": "password"}), "empty_email")]
    #[case::blank_password(json!({"email": "steven@gmail.com", "password": ""}), "empty_password")]
    #[actix_web::test]
    async fn malformed_bodies_are_422(#[case] body: Value, #[case] code: &str) {
        let mut service = MockLoginService::new();
        service.expect_login().times(0);

        let res = post_login(service, body).await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], code);
    }
}
