use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use uuid::Uuid;

use crate::auth::repository::{RefreshTokenRecord, RefreshTokenRepository};
use crate::auth::{AuthError, AuthResult};

const SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct RefreshTokenIssued {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Opaque refresh tokens persisted through a [`RefreshTokenRepository`].
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    /// Generate a fresh token for `user_id` and persist it, expiring one TTL after `now`.
    pub async fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> AuthResult<RefreshTokenIssued> {
        let token = generate_secret();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Config("refresh token lifetime out of range".into()))?;

        self.repository
            .create_refresh_token(&token, user_id, now, expires_at)
            .await?;

        Ok(RefreshTokenIssued { token, expires_at })
    }

    /// Look up a token row. Unknown tokens are [`AuthError::RefreshTokenNotFound`].
    pub async fn resolve(&self, token: &str) -> AuthResult<RefreshTokenRecord> {
        self.repository
            .lookup_refresh_token(token)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)
    }

    /// Mark a token revoked. Revoking twice is not an error.
    pub async fn revoke(&self, token: &str, now: DateTime<Utc>) -> AuthResult<()> {
        if self.repository.mark_refresh_token_revoked(token, now).await? {
            Ok(())
        } else {
            Err(AuthError::RefreshTokenNotFound)
        }
    }
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
