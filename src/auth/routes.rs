//! Session endpoints: login, access-token refresh, and refresh-token revocation.

use chrono::Utc;
use rocket::response::status::NoContent;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;

use crate::auth::AuthState;
use crate::auth::guards::AuthorizationHeader;
use crate::auth::responses::{LoginResponse, RefreshResponse};
use crate::error::ApiError;
use crate::models::UserCredentialsRequest;

/// Exchange email and password for an access token and a refresh token.
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(
    state: &State<AuthState>,
    payload: Json<UserCredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let (user, session) = state
        .login_user(email, &payload.password, Utc::now())
        .await?;

    log::info!("user {} logged in", user.id);

    Ok(Json(LoginResponse::new(
        user,
        session.access_token.token,
        session.refresh_token.token,
    )))
}

/// Mint a new access token from the refresh token in the `Authorization` header.
#[openapi(tag = "Auth")]
#[post("/refresh")]
pub async fn refresh(
    state: &State<AuthState>,
    authorization: AuthorizationHeader,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access_token = state.refresh(authorization.as_deref(), Utc::now()).await?;

    Ok(Json(RefreshResponse {
        token: access_token.token,
    }))
}

/// Revoke the refresh token in the `Authorization` header.
#[openapi(tag = "Auth")]
#[post("/revoke")]
pub async fn revoke(
    state: &State<AuthState>,
    authorization: AuthorizationHeader,
) -> Result<NoContent, ApiError> {
    state.logout(authorization.as_deref(), Utc::now()).await?;
    Ok(NoContent)
}
