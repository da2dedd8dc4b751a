//! Authentication module: configuration, credential handling, token minting,
//! session orchestration, Rocket request guards, and HTTP route handlers.

use std::sync::Arc;

use chrono::Duration;

pub mod bearer;
pub mod config;
pub mod error;
pub mod guards;
pub mod jwt;
pub mod passwords;
pub mod refresh_store;
pub mod repository;
pub mod responses;
pub mod routes;
pub mod session;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use guards::{AuthUser, AuthorizationHeader, authorize_owner};
pub use jwt::JwtService;
pub use passwords::PasswordService;
pub use refresh_store::RefreshTokenStore;
pub use repository::{
    CredentialRepository, MemoryAuthRepository, PgAuthRepository, RefreshTokenRepository,
};
pub use session::IssuedSession;

#[derive(Clone)]
pub struct AuthState {
    pub password_service: Arc<PasswordService>,
    pub jwt_service: Arc<JwtService>,
    pub refresh_store: RefreshTokenStore,
    pub credentials: Arc<dyn CredentialRepository>,
}

impl AuthState {
    pub fn new(
        password_service: PasswordService,
        jwt_service: JwtService,
        refresh_store: RefreshTokenStore,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Self {
        Self {
            password_service: Arc::new(password_service),
            jwt_service: Arc::new(jwt_service),
            refresh_store,
            credentials,
        }
    }

    /// Build every service from `config` on top of one repository that serves
    /// both refresh tokens and user credentials.
    pub fn from_config<R>(config: AuthConfig, repository: R) -> AuthResult<Self>
    where
        R: RefreshTokenRepository + CredentialRepository + 'static,
    {
        config.validate()?;

        let repository = Arc::new(repository);
        let password_service = PasswordService::new()?;
        let jwt_service = JwtService::from_config(&config)?;
        let refresh_ttl = Duration::try_seconds(config.refresh_token_ttl_secs)
            .ok_or_else(|| AuthError::Config("refresh token lifetime out of range".into()))?;
        let refresh_store = RefreshTokenStore::new(repository.clone(), refresh_ttl);

        Ok(Self::new(
            password_service,
            jwt_service,
            refresh_store,
            repository,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_lifetimes_that_cannot_be_represented() {
        let mut config = AuthConfig::with_secret("state-test-secret");
        config.access_token_ttl_secs = -10;
        assert!(matches!(
            AuthState::from_config(config.clone(), MemoryAuthRepository::new()),
            Err(AuthError::Config(_))
        ));

        config.access_token_ttl_secs = 3600;
        config.refresh_token_ttl_secs = i64::MAX;
        assert!(matches!(
            AuthState::from_config(config, MemoryAuthRepository::new()),
            Err(AuthError::Config(_))
        ));
    }
}
