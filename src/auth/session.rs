//! Session lifecycle on top of the password, access-token and refresh-token
//! services: login, request authentication, refresh and logout.
//!
//! Access tokens are stateless and live until their own expiry. Revoking a
//! refresh token stops new access tokens from being minted with it but does
//! not touch access tokens already handed out.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::bearer::extract_bearer;
use crate::auth::jwt::SignedAccessToken;
use crate::auth::refresh_store::RefreshTokenIssued;
use crate::auth::{AuthError, AuthResult, AuthState};
use crate::models::User;

/// Token pair handed out on a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access_token: SignedAccessToken,
    pub refresh_token: RefreshTokenIssued,
}

impl AuthState {
    /// Verify `password` against `stored_hash` and open a session for `user_id`.
    pub async fn login(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedSession> {
        self.password_service
            .verify_password(password, stored_hash)
            .map_err(|err| match err {
                AuthError::PasswordMismatch => AuthError::InvalidCredentials,
                other => other,
            })?;

        let access_token = self
            .jwt_service
            .issue_access_token(user_id, self.jwt_service.access_token_ttl(), now)?;
        let refresh_token = self.refresh_store.issue(user_id, now).await?;

        Ok(IssuedSession {
            access_token,
            refresh_token,
        })
    }

    /// Look the user up by email, then [`login`](Self::login). An unknown
    /// email fails exactly like a wrong password, including the Argon2 cost.
    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<(User, IssuedSession)> {
        let Some(credential) = self.credentials.lookup_user_credential(email).await? else {
            return Err(match self.password_service.verify_unknown_user(password) {
                Err(AuthError::Hashing(msg)) => AuthError::Hashing(msg),
                _ => AuthError::InvalidCredentials,
            });
        };

        let session = self
            .login(password, &credential.hashed_password, credential.user.id, now)
            .await?;

        Ok((credential.user, session))
    }

    /// Resolve the access token in an `Authorization` header to a user id.
    pub fn authenticate_request(&self, header: Option<&str>) -> AuthResult<Uuid> {
        let token = extract_bearer(header).map_err(AuthError::into_unauthorized)?;
        self.jwt_service
            .validate_access_token(token)
            .map_err(AuthError::into_unauthorized)
    }

    /// Exchange the refresh token in an `Authorization` header for a new access token.
    pub async fn refresh(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<SignedAccessToken> {
        let token = extract_bearer(header)?;
        let record = self.refresh_store.resolve(token).await?;

        if !record.is_active(now) {
            return Err(AuthError::SessionExpired);
        }

        self.jwt_service
            .issue_access_token(record.user_id, self.jwt_service.access_token_ttl(), now)
    }

    /// Revoke the refresh token in an `Authorization` header.
    pub async fn logout(&self, header: Option<&str>, now: DateTime<Utc>) -> AuthResult<()> {
        let token = extract_bearer(header)?;
        self.refresh_store.revoke(token, now).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::auth::{AuthConfig, MemoryAuthRepository};

    const PASSWORD: &str = "04234";

    fn make_state() -> (MemoryAuthRepository, AuthState, User) {
        let repo = MemoryAuthRepository::new();
        let state = AuthState::from_config(AuthConfig::with_secret("session-test-secret"), repo.clone())
            .expect("auth state");
        let hash = state
            .password_service
            .hash_password(PASSWORD)
            .expect("hash password");
        let user = repo.insert_user("walt@breakingbad.com", &hash);
        (repo, state, user)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn login_refresh_logout_scenario() {
        let (_, state, user) = make_state();
        let now = Utc::now();

        let (logged_in, session) = state
            .login_user("walt@breakingbad.com", PASSWORD, now)
            .await
            .expect("login");
        assert_eq!(logged_in.id, user.id);

        let access_header = bearer(&session.access_token.token);
        assert_eq!(
            state
                .authenticate_request(Some(&access_header))
                .expect("authenticate"),
            user.id
        );
        let record = state
            .refresh_store
            .resolve(&session.refresh_token.token)
            .await
            .expect("resolve refresh token");
        assert_eq!(record.user_id, user.id);

        let refresh_header = bearer(&session.refresh_token.token);
        let refreshed = state
            .refresh(Some(&refresh_header), now)
            .await
            .expect("refresh");
        assert_eq!(
            state
                .jwt_service
                .validate_access_token(&refreshed.token)
                .expect("refreshed token valid"),
            user.id
        );

        state
            .logout(Some(&refresh_header), now)
            .await
            .expect("logout");
        assert!(matches!(
            state.refresh(Some(&refresh_header), now).await,
            Err(AuthError::SessionExpired)
        ));

        // A second logout is a no-op, and the token stays unusable.
        state
            .logout(Some(&refresh_header), now)
            .await
            .expect("second logout");
        assert!(matches!(
            state.refresh(Some(&refresh_header), now).await,
            Err(AuthError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn access_tokens_survive_refresh_revocation() {
        let (_, state, user) = make_state();
        let now = Utc::now();
        let (_, session) = state
            .login_user("walt@breakingbad.com", PASSWORD, now)
            .await
            .expect("login");

        state
            .logout(Some(&bearer(&session.refresh_token.token)), now)
            .await
            .expect("logout");

        assert_eq!(
            state
                .authenticate_request(Some(&bearer(&session.access_token.token)))
                .expect("access token still valid"),
            user.id
        );
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_alike() {
        let (repo, state, _) = make_state();
        let now = Utc::now();

        let wrong_password = state
            .login_user("walt@breakingbad.com", "wrong", now)
            .await
            .expect_err("wrong password rejected");
        let unknown_email = state
            .login_user("jesse@breakingbad.com", PASSWORD, now)
            .await
            .expect_err("unknown email rejected");

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.public_message(), unknown_email.public_message());
        assert_eq!(repo.refresh_token_count(), 0);
    }

    #[tokio::test]
    async fn unknown_email_pays_the_same_hashing_cost() {
        let (_, state, _) = make_state();
        let now = Utc::now();

        let mut wrong_password = std::time::Duration::MAX;
        let mut unknown_email = std::time::Duration::MAX;
        for _ in 0..3 {
            let started = std::time::Instant::now();
            let _ = state.login_user("walt@breakingbad.com", "wrong", now).await;
            wrong_password = wrong_password.min(started.elapsed());

            let started = std::time::Instant::now();
            let _ = state.login_user("jesse@breakingbad.com", "wrong", now).await;
            unknown_email = unknown_email.min(started.elapsed());
        }

        assert!(
            unknown_email * 4 >= wrong_password,
            "unknown email answered in {unknown_email:?}, wrong password in {wrong_password:?}"
        );
    }

    #[tokio::test]
    async fn login_stamps_both_tokens_with_the_same_instant() {
        let (_, state, user) = make_state();
        let now = Utc::now() - Duration::seconds(90);

        let (_, session) = state
            .login_user("walt@breakingbad.com", PASSWORD, now)
            .await
            .expect("login");

        let claims = state
            .jwt_service
            .decode_access_token(&session.access_token.token)
            .expect("decode");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(session.access_token.expires_at, now + Duration::hours(1));

        let record = state
            .refresh_store
            .resolve(&session.refresh_token.token)
            .await
            .expect("resolve");
        assert_eq!(record.created_at, now);
        assert_eq!(record.user_id, user.id);
        assert_eq!(record.expires_at, now + Duration::days(60));
    }

    #[tokio::test]
    async fn each_login_gets_its_own_refresh_token() {
        let (repo, state, _) = make_state();
        let now = Utc::now();

        let (_, first) = state
            .login_user("walt@breakingbad.com", PASSWORD, now)
            .await
            .expect("first login");
        let (_, second) = state
            .login_user("walt@breakingbad.com", PASSWORD, now)
            .await
            .expect("second login");
        assert_eq!(repo.refresh_token_count(), 2);

        state
            .logout(Some(&bearer(&first.refresh_token.token)), now)
            .await
            .expect("logout first");
        state
            .refresh(Some(&bearer(&second.refresh_token.token)), now)
            .await
            .expect("second session unaffected");
    }

    #[tokio::test]
    async fn expired_refresh_tokens_are_rejected() {
        let (_, state, user) = make_state();
        let issued_at = Utc::now() - Duration::days(61);
        let hash = state
            .password_service
            .hash_password(PASSWORD)
            .expect("hash");
        let session = state
            .login(PASSWORD, &hash, user.id, issued_at)
            .await
            .expect("login in the past");

        assert!(matches!(
            state
                .refresh(Some(&bearer(&session.refresh_token.token)), Utc::now())
                .await,
            Err(AuthError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn refresh_reports_header_problems() {
        let (_, state, _) = make_state();
        let now = Utc::now();

        assert!(matches!(
            state.refresh(None, now).await,
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            state.logout(Some("Bearer"), now).await,
            Err(AuthError::MalformedCredential)
        ));
        assert!(matches!(
            state.refresh(Some("Bearer unknown"), now).await,
            Err(AuthError::RefreshTokenNotFound)
        ));
    }

    #[test]
    fn authenticate_request_collapses_failures() {
        let (_, state, _) = make_state();

        assert!(matches!(
            state.authenticate_request(None),
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            state.authenticate_request(Some("Bearer not-a-jwt")),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn refresh_tokens_do_not_authenticate_requests() {
        let (_, state, _) = make_state();
        assert!(state.authenticate_request(Some("Bearer c2VjcmV0")).is_err());
    }
}
