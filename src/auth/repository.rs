//! Persistence seams used by the auth core.
//!
//! The session logic only talks to these traits. [`PgAuthRepository`] backs
//! them with PostgreSQL; [`MemoryAuthRepository`] keeps everything in process
//! and is what the unit and route tests run against.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rocket_db_pools::sqlx::{self, FromRow, PgPool};
use uuid::Uuid;

use crate::auth::AuthResult;
use crate::models::{User, UserCredential};

/// A persisted refresh token row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Usable to mint access tokens: never revoked and not yet expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

#[rocket::async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert a new, unrevoked row.
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<RefreshTokenRecord>;

    async fn lookup_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshTokenRecord>>;

    /// Stamp `revoked_at` unless it is already set. Returns `false` when no
    /// row matches.
    async fn mark_refresh_token_revoked(&self, token: &str, now: DateTime<Utc>)
    -> AuthResult<bool>;
}

#[rocket::async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Find a user and password hash by email, case-insensitively.
    async fn lookup_user_credential(&self, email: &str) -> AuthResult<Option<UserCredential>>;
}

#[derive(Debug, Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[rocket::async_trait]
impl RefreshTokenRepository for PgAuthRepository {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<RefreshTokenRecord> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $3, $4)
            RETURNING token, user_id, created_at, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(created_at)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn lookup_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT token, user_id, created_at, expires_at, revoked_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn mark_refresh_token_revoked(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = COALESCE(revoked_at, $2), updated_at = $2 WHERE token = $1",
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[rocket::async_trait]
impl CredentialRepository for PgAuthRepository {
    async fn lookup_user_credential(&self, email: &str) -> AuthResult<Option<UserCredential>> {
        let credential = sqlx::query_as::<_, UserCredential>(
            r#"
            SELECT id, created_at, updated_at, email, is_chirpy_red, hashed_password
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }
}

/// In-process repository keyed by token value and lowercase email.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthRepository {
    refresh_tokens: Arc<DashMap<String, RefreshTokenRecord>>,
    credentials: Arc<DashMap<String, UserCredential>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with an already-hashed password.
    pub fn insert_user(&self, email: &str, hashed_password: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.trim().to_string(),
            is_chirpy_red: false,
        };
        self.credentials.insert(
            email.trim().to_lowercase(),
            UserCredential {
                user: user.clone(),
                hashed_password: hashed_password.to_string(),
            },
        );
        user
    }

    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.len()
    }
}

#[rocket::async_trait]
impl RefreshTokenRepository for MemoryAuthRepository {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<RefreshTokenRecord> {
        let record = RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            created_at,
            expires_at,
            revoked_at: None,
        };
        self.refresh_tokens.insert(token.to_string(), record.clone());
        Ok(record)
    }

    async fn lookup_refresh_token(&self, token: &str) -> AuthResult<Option<RefreshTokenRecord>> {
        Ok(self.refresh_tokens.get(token).map(|entry| entry.clone()))
    }

    async fn mark_refresh_token_revoked(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        match self.refresh_tokens.get_mut(token) {
            Some(mut entry) => {
                entry.revoked_at.get_or_insert(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[rocket::async_trait]
impl CredentialRepository for MemoryAuthRepository {
    async fn lookup_user_credential(&self, email: &str) -> AuthResult<Option<UserCredential>> {
        Ok(self
            .credentials
            .get(&email.trim().to_lowercase())
            .map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn memory_revocation_keeps_first_instant() {
        let repo = MemoryAuthRepository::new();
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        repo.create_refresh_token("tok", user_id, now, now + Duration::days(60))
            .await
            .expect("create");

        let first = now + Duration::seconds(5);
        assert!(repo.mark_refresh_token_revoked("tok", first).await.expect("revoke"));
        assert!(
            repo.mark_refresh_token_revoked("tok", first + Duration::seconds(5))
                .await
                .expect("revoke again")
        );

        let record = repo
            .lookup_refresh_token("tok")
            .await
            .expect("lookup")
            .expect("row present");
        assert_eq!(record.revoked_at, Some(first));
        assert!(!record.is_active(first));
    }

    #[tokio::test]
    async fn memory_revocation_of_unknown_token_reports_missing() {
        let repo = MemoryAuthRepository::new();
        assert!(!repo.mark_refresh_token_revoked("nope", Utc::now()).await.expect("revoke"));
    }

    #[tokio::test]
    async fn credential_lookup_ignores_email_case() {
        let repo = MemoryAuthRepository::new();
        let user = repo.insert_user("Walt@Breakingbad.com", "$argon2id$stub");

        let found = repo
            .lookup_user_credential("walt@breakingbad.com")
            .await
            .expect("lookup")
            .expect("user present");
        assert_eq!(found.user.id, user.id);
        assert_eq!(found.hashed_password, "$argon2id$stub");
    }

    #[test]
    fn record_expires_at_its_expiry_instant() {
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token: "tok".into(),
            user_id: Uuid::new_v4(),
            created_at: now - Duration::days(60),
            expires_at: now,
            revoked_at: None,
        };
        assert!(record.is_active(now - Duration::seconds(1)));
        assert!(!record.is_active(now));
    }
}
