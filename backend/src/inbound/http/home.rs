//! Root greeting.

use actix_web::{get, web};

/// Body returned by `GET /`.
pub const WELCOME: &str = "Welcome To This Awesome API";

/// Greet clients probing the API root.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = String)),
    tags = ["home"],
    operation_id = "home",
    security([])
)]
#[get("/")]
pub async fn home() -> web::Json<&'static str> {
    web::Json(WELCOME)
}
