//! Chirp endpoints. Anyone may read; only the author may delete.

use rocket::response::status::{Created, NoContent};
use rocket::serde::json::Json;
use rocket::{State, delete, get, post};
use rocket_db_pools::sqlx::{self, PgPool};
use rocket_okapi::openapi;
use uuid::Uuid;

use crate::auth::{AuthUser, authorize_owner};
use crate::error::ApiError;
use crate::models::{Chirp, CreateChirpRequest};

/// Post a chirp as the authenticated user.
#[openapi(tag = "Chirps")]
#[post("/chirps", data = "<payload>")]
pub async fn create_chirp(
    user: AuthUser,
    pool: &State<PgPool>,
    payload: Json<CreateChirpRequest>,
) -> Result<Created<Json<Chirp>>, ApiError> {
    let chirp = sqlx::query_as::<_, Chirp>(
        r#"
        INSERT INTO chirps (id, body, user_id)
        VALUES ($1, $2, $3)
        RETURNING id, created_at, updated_at, body, user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.body)
    .bind(user.id)
    .fetch_one(pool.inner())
    .await?;

    Ok(Created::new(format!("/api/chirps/{}", chirp.id)).body(Json(chirp)))
}

/// List every chirp, oldest first.
#[openapi(tag = "Chirps")]
#[get("/chirps")]
pub async fn list_chirps(pool: &State<PgPool>) -> Result<Json<Vec<Chirp>>, ApiError> {
    let chirps = sqlx::query_as::<_, Chirp>(
        "SELECT id, created_at, updated_at, body, user_id FROM chirps ORDER BY created_at ASC",
    )
    .fetch_all(pool.inner())
    .await?;

    Ok(Json(chirps))
}

/// Fetch a single chirp.
#[openapi(tag = "Chirps")]
#[get("/chirps/<chirp_id>")]
pub async fn get_chirp(pool: &State<PgPool>, chirp_id: Uuid) -> Result<Json<Chirp>, ApiError> {
    let chirp = sqlx::query_as::<_, Chirp>(
        "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
    )
    .bind(chirp_id)
    .fetch_optional(pool.inner())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("chirp '{chirp_id}' not found")))?;

    Ok(Json(chirp))
}

/// Delete a chirp. Only its author may do so.
#[openapi(tag = "Chirps")]
#[delete("/chirps/<chirp_id>")]
pub async fn delete_chirp(
    user: AuthUser,
    pool: &State<PgPool>,
    chirp_id: Uuid,
) -> Result<NoContent, ApiError> {
    let owner_id: Uuid = sqlx::query_scalar("SELECT user_id FROM chirps WHERE id = $1")
        .bind(chirp_id)
        .fetch_optional(pool.inner())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("chirp '{chirp_id}' not found")))?;

    authorize_owner(owner_id, user.id)?;

    sqlx::query("DELETE FROM chirps WHERE id = $1 AND user_id = $2")
        .bind(chirp_id)
        .bind(user.id)
        .execute(pool.inner())
        .await?;

    log::info!("user {} deleted chirp {}", user.id, chirp_id);

    Ok(NoContent)
}
