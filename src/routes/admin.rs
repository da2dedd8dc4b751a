//! Development-only maintenance endpoints.

use rocket::request::{FromRequest, Outcome};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{Request, State, get, post};
use rocket_db_pools::sqlx::{self, PgPool};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::config::{AppConfig, Platform};
use crate::error::ApiError;
use crate::metrics::HitCounter;

/// Passes only when the process runs on the `dev` platform.
#[derive(Debug, Clone, Copy)]
pub struct RequireDevPlatform;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequireDevPlatform {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match request.guard::<&State<AppConfig>>().await {
            Outcome::Success(config) if config.platform == Platform::Dev => {
                Outcome::Success(RequireDevPlatform)
            }
            Outcome::Success(_) => {
                let err = AuthError::Forbidden;
                Outcome::Error((err.status(), err))
            }
            _ => {
                let err = AuthError::Config("AppConfig not available".into());
                Outcome::Error((err.status(), err))
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub deleted_users: u64,
}

/// Static file server visit count.
#[get("/metrics")]
pub fn metrics(counter: &State<HitCounter>) -> RawHtml<String> {
    RawHtml(render_metrics(counter.hits()))
}

fn render_metrics(hits: u64) -> String {
    format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {hits} times!</p>\n  </body>\n</html>"
    )
}

/// Delete every user, cascading to their chirps and refresh tokens, and zero
/// the visit count.
#[post("/reset")]
pub async fn reset(
    _dev: RequireDevPlatform,
    pool: &State<PgPool>,
    counter: &State<HitCounter>,
) -> Result<Json<ResetResponse>, ApiError> {
    let result = sqlx::query("DELETE FROM users")
        .execute(pool.inner())
        .await?;
    counter.reset();

    log::warn!("reset removed {} users", result.rows_affected());

    Ok(Json(ResetResponse {
        deleted_users: result.rows_affected(),
    }))
}
