//! Account endpoints: sign-up and self-service credential updates.

use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, post, put};
use rocket_db_pools::sqlx::{self, PgPool};
use rocket_okapi::openapi;
use uuid::Uuid;

use crate::auth::{AuthError, AuthState, AuthUser};
use crate::error::ApiError;
use crate::models::{User, UserCredentialsRequest};
use crate::routes::helpers::{require_credentials, user_write_error};

/// Register a new user.
#[openapi(tag = "Users")]
#[post("/users", data = "<payload>")]
pub async fn create_user(
    state: &State<AuthState>,
    pool: &State<PgPool>,
    payload: Json<UserCredentialsRequest>,
) -> Result<Created<Json<User>>, ApiError> {
    require_credentials(&payload.email, &payload.password)?;

    let hashed_password = state.password_service.hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, hashed_password)
        VALUES ($1, $2, $3)
        RETURNING id, created_at, updated_at, email, is_chirpy_red
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.email.trim())
    .bind(hashed_password)
    .fetch_one(pool.inner())
    .await
    .map_err(user_write_error)?;

    log::info!("created user {}", user.id);

    Ok(Created::new("/api/users").body(Json(user)))
}

/// Replace the caller's email and password.
#[openapi(tag = "Users")]
#[put("/users", data = "<payload>")]
pub async fn update_user(
    user: AuthUser,
    state: &State<AuthState>,
    pool: &State<PgPool>,
    payload: Json<UserCredentialsRequest>,
) -> Result<Json<User>, ApiError> {
    require_credentials(&payload.email, &payload.password)?;

    let hashed_password = state.password_service.hash_password(&payload.password)?;

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = $1, hashed_password = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING id, created_at, updated_at, email, is_chirpy_red
        "#,
    )
    .bind(payload.email.trim())
    .bind(hashed_password)
    .bind(user.id)
    .fetch_optional(pool.inner())
    .await
    .map_err(user_write_error)?;

    // The token outlived its account.
    let updated = updated.ok_or(ApiError::Auth(AuthError::Unauthorized))?;

    Ok(Json(updated))
}
