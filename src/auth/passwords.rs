use argon2::{
    Algorithm, Argon2, ParamsBuilder, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::auth::{AuthError, AuthResult};

const SALT_LEN: usize = 16;

/// Argon2id hashing for user passwords.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
    /// Hash of a random password nobody knows, checked when an email has no account.
    unknown_user_hash: String,
}

impl PasswordService {
    pub fn new() -> AuthResult<Self> {
        let mut builder = ParamsBuilder::new();
        builder.m_cost(19 * 1024); // 19 MiB
        builder.t_cost(2);
        builder.p_cost(1);
        let params = builder.build().map_err(AuthError::from)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut unknown = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut unknown);
        let mut service = Self {
            argon2,
            unknown_user_hash: String::new(),
        };
        service.unknown_user_hash = service.hash_password(&URL_SAFE_NO_PAD.encode(unknown))?;
        Ok(service)
    }

    /// Hash `password` into a PHC string. Every call draws a fresh salt.
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(AuthError::from)?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(AuthError::from)?
            .to_string();
        Ok(hash)
    }

    /// Check `password` against a stored PHC string.
    ///
    /// A wrong password yields [`AuthError::PasswordMismatch`]; an unreadable
    /// stored hash is a [`AuthError::Hashing`] failure.
    pub fn verify_password(&self, password: &str, encoded: &str) -> AuthResult<()> {
        let parsed = PasswordHash::new(encoded)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(argon2::password_hash::Error::Password) => Err(AuthError::PasswordMismatch),
            Err(err) => Err(AuthError::from(err)),
        }
    }

    /// Run a full verification for a login whose email matched no account, so
    /// the response takes as long as a wrong password. Always a mismatch.
    pub fn verify_unknown_user(&self, password: &str) -> AuthResult<()> {
        self.verify_password(password, &self.unknown_user_hash)
    }
}
