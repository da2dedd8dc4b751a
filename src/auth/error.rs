use rocket::http::Status;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password mismatch")]
    PasswordMismatch,
    #[error("unauthorized")]
    Unauthorized,
    #[error("authorization header missing")]
    MissingCredential,
    #[error("authorization header malformed")]
    MalformedCredential,
    #[error("token invalid")]
    TokenInvalid,
    #[error("refresh token not found")]
    RefreshTokenNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("forbidden")]
    Forbidden,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Storage(#[from] rocket_db_pools::sqlx::Error),
    #[error("token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing error: {0}")]
    Hashing(String),
}

impl AuthError {
    pub fn status(&self) -> Status {
        match self {
            AuthError::InvalidCredentials
            | AuthError::PasswordMismatch
            | AuthError::Unauthorized
            | AuthError::TokenInvalid
            | AuthError::RefreshTokenNotFound
            | AuthError::SessionExpired => Status::Unauthorized,
            AuthError::MissingCredential | AuthError::MalformedCredential => Status::BadRequest,
            AuthError::Forbidden => Status::Forbidden,
            AuthError::Config(_)
            | AuthError::Storage(_)
            | AuthError::Signing(_)
            | AuthError::Hashing(_) => Status::InternalServerError,
        }
    }

    /// Message safe to return to clients. Every credential rejection reads the
    /// same so callers cannot tell which check failed.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials | AuthError::PasswordMismatch => {
                "incorrect email or password"
            }
            AuthError::Unauthorized
            | AuthError::TokenInvalid
            | AuthError::RefreshTokenNotFound
            | AuthError::SessionExpired => "unauthorized",
            AuthError::MissingCredential | AuthError::MalformedCredential => {
                "missing or malformed authorization header"
            }
            AuthError::Forbidden => "forbidden",
            AuthError::Config(_)
            | AuthError::Storage(_)
            | AuthError::Signing(_)
            | AuthError::Hashing(_) => "internal server error",
        }
    }

    /// Collapses every rejection of a presented credential into
    /// [`AuthError::Unauthorized`]. Internal failures pass through untouched.
    pub fn into_unauthorized(self) -> Self {
        if self.status() == Status::InternalServerError {
            self
        } else {
            AuthError::Unauthorized
        }
    }
}

impl From<argon2::Error> for AuthError {
    fn from(err: argon2::Error) -> Self {
        AuthError::Hashing(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::Hashing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_rejections_share_public_message() {
        assert_eq!(
            AuthError::InvalidCredentials.public_message(),
            AuthError::PasswordMismatch.public_message()
        );
        assert_eq!(
            AuthError::SessionExpired.public_message(),
            AuthError::RefreshTokenNotFound.public_message()
        );
    }

    #[test]
    fn header_errors_collapse_to_unauthorized() {
        assert!(matches!(
            AuthError::MissingCredential.into_unauthorized(),
            AuthError::Unauthorized
        ));
        assert!(matches!(
            AuthError::Hashing("boom".into()).into_unauthorized(),
            AuthError::Hashing(_)
        ));
    }

    #[test]
    fn collapse_keeps_internal_failures_and_folds_the_rest() {
        for err in [
            AuthError::MalformedCredential,
            AuthError::TokenInvalid,
            AuthError::SessionExpired,
            AuthError::Forbidden,
        ] {
            assert_eq!(err.into_unauthorized().status(), Status::Unauthorized);
        }

        let config = AuthError::Config("missing".into()).into_unauthorized();
        assert!(matches!(config, AuthError::Config(_)));
        assert_eq!(config.status(), Status::InternalServerError);
    }
}
