//! Readiness check. Answers as soon as Rocket is serving; it does not touch the database.

use rocket::get;
use rocket_okapi::openapi;

/// Plain-text `OK` for load balancers.
#[openapi(tag = "Health")]
#[get("/healthz")]
pub fn health_check() -> &'static str {
    "OK"
}
