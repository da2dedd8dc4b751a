//! Payment provider webhook that upgrades accounts to Chirpy Red.

use rocket::request::{FromRequest, Outcome};
use rocket::response::status::NoContent;
use rocket::serde::json::Json;
use rocket::{Request, State, post};
use rocket_db_pools::sqlx::{self, PgPool};
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use rocket_okapi::request::OpenApiFromRequest;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::bearer::{API_KEY_SCHEME, constant_time_eq, extract_credential};
use crate::auth::{AuthError, AuthResult};
use crate::config::AppConfig;
use crate::error::ApiError;

pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PolkaWebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: Option<PolkaWebhookData>,
}

/// The id stays a string until the event is known to need it.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PolkaWebhookData {
    pub user_id: String,
}

/// Proof that the caller presented the configured `ApiKey`.
#[derive(Debug, OpenApiFromRequest)]
pub struct PolkaKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for PolkaKey {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match request.guard::<&State<AppConfig>>().await {
            Outcome::Success(config) => config,
            _ => {
                let err = AuthError::Config("AppConfig not available".into());
                return Outcome::Error((err.status(), err));
            }
        };

        match check_api_key(config, request.headers().get_one("Authorization")) {
            Ok(()) => Outcome::Success(PolkaKey),
            Err(err) => {
                let err = err.into_unauthorized();
                Outcome::Error((err.status(), err))
            }
        }
    }
}

fn check_api_key(config: &AppConfig, header: Option<&str>) -> AuthResult<()> {
    let presented = extract_credential(header, API_KEY_SCHEME)?;
    let expected = config.polka_key.as_deref().ok_or(AuthError::Unauthorized)?;

    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}

fn upgraded_user_id(payload: &PolkaWebhookRequest) -> Result<Uuid, ApiError> {
    let raw = payload
        .data
        .as_ref()
        .map(|data| data.user_id.trim())
        .ok_or_else(|| ApiError::BadRequest("missing user id".to_string()))?;

    raw.parse::<Uuid>()
        .map_err(|_| ApiError::BadRequest("invalid user id".to_string()))
}

/// Receive payment events. Only `user.upgraded` has an effect.
#[openapi(tag = "Webhooks")]
#[post("/polka/webhooks", data = "<payload>")]
pub async fn polka_webhook(
    _key: PolkaKey,
    pool: &State<PgPool>,
    payload: Json<PolkaWebhookRequest>,
) -> Result<NoContent, ApiError> {
    if payload.event != USER_UPGRADED_EVENT {
        return Ok(NoContent);
    }

    let user_id = upgraded_user_id(&payload)?;

    let result =
        sqlx::query("UPDATE users SET is_chirpy_red = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(pool.inner())
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("user '{user_id}' not found")));
    }

    log::info!("user {} upgraded to chirpy red", user_id);

    Ok(NoContent)
}
