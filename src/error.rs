use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{Request, Response, catch};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::auth::AuthError;

#[derive(Debug)]
pub enum ApiError {
    DatabaseError(sqlx::Error),
    NotFound(String),
    BadRequest(String),
    Auth(AuthError),
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, error_type, message) = match self {
            ApiError::DatabaseError(e) => {
                log::error!("database error: {}", e);
                (
                    Status::InternalServerError,
                    "DatabaseError",
                    "internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => {
                log::debug!("not found: {}", msg);
                (Status::NotFound, "NotFound", msg)
            }
            ApiError::BadRequest(msg) => {
                log::debug!("bad request: {}", msg);
                (Status::BadRequest, "BadRequest", msg)
            }
            ApiError::Auth(err) => {
                let status = err.status();
                if status == Status::InternalServerError {
                    log::error!("auth failure: {}", err);
                } else {
                    log::debug!("auth rejection: {}", err);
                }
                (status, auth_error_type(status), err.public_message().to_string())
            }
        };

        json_response(status, error_type, message)
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(_generator: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        Ok(Responses::default())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::DatabaseError(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

fn auth_error_type(status: Status) -> &'static str {
    match status.code {
        400 => "BadRequest",
        401 => "Unauthorized",
        403 => "Forbidden",
        _ => "InternalError",
    }
}

fn json_response(
    status: Status,
    error_type: &str,
    message: String,
) -> response::Result<'static> {
    let error_response = ErrorResponse {
        error: error_type.to_string(),
        message,
    };

    let json = serde_json::to_string(&error_response).unwrap_or_else(|_| {
        r#"{"error":"SerializationError","message":"Failed to serialize error"}"#.to_string()
    });

    Response::build()
        .status(status)
        .header(rocket::http::ContentType::JSON)
        .sized_body(json.len(), Cursor::new(json))
        .ok()
}

/// JSON body for failures that never reach a handler, such as rejected
/// request guards or unparsable payloads.
#[catch(default)]
pub fn default_catcher(status: Status, _request: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    let reason = status.reason_lossy();
    (
        status,
        Json(ErrorResponse {
            error: reason.replace(' ', ""),
            message: reason.to_lowercase(),
        }),
    )
}
