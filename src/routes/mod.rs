//! HTTP route handlers grouped by resource domain.
//!
//! Session endpoints live in [`crate::auth::routes`]; everything else is
//! here. Public handlers are annotated with `#[openapi]` so `rocket_okapi`
//! can derive an OpenAPI document automatically.

pub mod admin;
pub mod chirps;
pub mod health;
pub(crate) mod helpers;
pub mod polka;
pub mod users;
