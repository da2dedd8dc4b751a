use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::auth::{AuthConfig, AuthError, AuthResult};

/// Algorithms accepted on verification. Anything outside the HMAC family is
/// refused so a token cannot pick its own verification scheme.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct SignedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_token_ttl: Duration,
}

impl JwtService {
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(AuthError::Config("jwt secret must not be empty".into()));
        }
        config.validate()?;
        let access_token_ttl = Duration::try_seconds(config.access_token_ttl_secs)
            .ok_or_else(|| AuthError::Config("access token lifetime out of range".into()))?;

        let secret_bytes = config.jwt_secret.as_bytes();
        let encoding_key = EncodingKey::from_secret(secret_bytes);
        let decoding_key = DecodingKey::from_secret(secret_bytes);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.set_issuer(&[config.issuer.clone()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            access_token_ttl,
        })
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Sign an HS256 token for `user_id`, issued at `now` and expiring `ttl` later.
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<SignedAccessToken> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Config("access token lifetime out of range".into()))?;

        let claims = AccessTokenClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(SignedAccessToken { token, expires_at })
    }

    /// Verify signature, algorithm family, issuer and required claims.
    ///
    /// Every decode failure is reported as [`AuthError::TokenInvalid`].
    pub fn decode_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| {
                log::debug!("access token rejected: {:?}", err.kind());
                AuthError::TokenInvalid
            })?;
        let claims = token_data.claims;
        validate_claims(&claims)?;
        Ok(claims)
    }

    /// Resolve a token to the user it was issued for.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<Uuid> {
        let claims = self.decode_access_token(token)?;
        claims.sub.parse::<Uuid>().map_err(|_| AuthError::TokenInvalid)
    }
}

// `jsonwebtoken` accepts a token in its expiry second; the token is dead from `exp` on.
fn validate_claims(claims: &AccessTokenClaims) -> AuthResult<()> {
    let now = Utc::now().timestamp();
    if claims.exp <= now {
        return Err(AuthError::TokenInvalid);
    }
    Ok(())
}
