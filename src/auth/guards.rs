use rocket::Request;
use rocket::State;
use rocket::request::{FromRequest, Outcome};
use rocket_okapi::request::OpenApiFromRequest;
use uuid::Uuid;

use crate::auth::{AuthError, AuthResult, AuthState};

/// Caller identity resolved from a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, OpenApiFromRequest)]
pub struct AuthUser {
    pub id: Uuid,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match extract_user(request).await {
            Ok(user) => Outcome::Success(user),
            Err(err) => {
                log::debug!("request authentication failed: {err}");
                Outcome::Error((err.status(), err))
            }
        }
    }
}

/// Raw `Authorization` header value, if the request carried one.
#[derive(Debug, Clone, OpenApiFromRequest)]
pub struct AuthorizationHeader(pub Option<String>);

impl AuthorizationHeader {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthorizationHeader {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let value = request
            .headers()
            .get_one("Authorization")
            .map(|value| value.to_string());
        Outcome::Success(AuthorizationHeader(value))
    }
}

/// Allow a mutation only when the caller owns the resource.
pub fn authorize_owner(owner_id: Uuid, requester_id: Uuid) -> AuthResult<()> {
    if owner_id == requester_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

async fn extract_user(request: &Request<'_>) -> AuthResult<AuthUser> {
    let auth_state = request
        .guard::<&State<AuthState>>()
        .await
        .succeeded()
        .ok_or_else(|| AuthError::Config("AuthState missing from state".into()))?;

    let header = request.headers().get_one("Authorization");
    let id = auth_state.authenticate_request(header)?;

    Ok(AuthUser { id })
}
