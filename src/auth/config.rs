use crate::auth::{AuthError, AuthResult};

const DEFAULT_ISSUER: &str = "chirpy";
const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 60 * 24 * 60 * 60;
/// Upper bound for either lifetime: ten years.
const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Authentication configuration loaded from environment variables.
#[derive(Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> AuthResult<Self> {
        let issuer = std::env::var("CHIRPY_JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.into());
        let access_token_ttl_secs = parse_ttl(
            "CHIRPY_ACCESS_TOKEN_TTL_SECS",
            std::env::var("CHIRPY_ACCESS_TOKEN_TTL_SECS").ok(),
            DEFAULT_ACCESS_TOKEN_TTL_SECS,
        )?;
        let refresh_token_ttl_secs = parse_ttl(
            "CHIRPY_REFRESH_TOKEN_TTL_SECS",
            std::env::var("CHIRPY_REFRESH_TOKEN_TTL_SECS").ok(),
            DEFAULT_REFRESH_TOKEN_TTL_SECS,
        )?;
        let jwt_secret = std::env::var("CHIRPY_JWT_SECRET")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AuthError::Config("CHIRPY_JWT_SECRET is required".into()))?;

        let config = Self {
            issuer,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            jwt_secret,
        };
        config.validate()?;
        Ok(config)
    }

    /// Both lifetimes must be positive and no longer than ten years.
    pub fn validate(&self) -> AuthResult<()> {
        check_ttl("access token lifetime", self.access_token_ttl_secs)?;
        check_ttl("refresh token lifetime", self.refresh_token_ttl_secs)
    }

    /// Configuration with default lifetimes and the given signing secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            issuer: DEFAULT_ISSUER.into(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            jwt_secret: secret.into(),
        }
    }
}

fn check_ttl(name: &str, secs: i64) -> AuthResult<()> {
    if secs <= 0 || secs > MAX_TTL_SECS {
        return Err(AuthError::Config(format!(
            "{name} must be between 1 and {MAX_TTL_SECS} seconds, got {secs}"
        )));
    }
    Ok(())
}

/// An unset variable takes the default; a set one must parse.
fn parse_ttl(name: &str, raw: Option<String>, default: i64) -> AuthResult<i64> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| AuthError::Config(format!("{name} is not a whole number of seconds"))),
    }
}

// The secret stays out of debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}
