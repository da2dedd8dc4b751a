//! Shared helper functions for Rocket route handlers.

use crate::error::ApiError;

/// Map a failed write to the `users` table.
///
/// A duplicate email is reported with the same generic message as any other
/// rejected write so the response never confirms that an address is taken.
pub fn user_write_error(err: sqlx::Error) -> ApiError {
    let unique_violation = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);

    if unique_violation {
        log::debug!("user write rejected: duplicate email");
        ApiError::BadRequest("unable to save user".to_string())
    } else {
        ApiError::from(err)
    }
}

/// Require a non-blank email and a non-empty password.
pub fn require_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }
    Ok(())
}
