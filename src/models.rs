use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ===== Users =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_chirpy_red: bool,
}

/// A user row together with its stored password hash. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredential {
    #[sqlx(flatten)]
    pub user: User,
    pub hashed_password: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UserCredentialsRequest {
    pub email: String,
    pub password: String,
}

// ===== Chirps =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateChirpRequest {
    pub body: String,
}
