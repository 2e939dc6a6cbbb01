//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Authentication failures are deliberately indistinguishable: unknown
//! email, role mismatch, and wrong password all surface as the same
//! `InvalidCredentials` 401, so callers cannot probe which accounts exist.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Malformed or missing input, rejected before any store mutation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An account with this email already exists
    #[error("An account with this email already exists")]
    EmailExists,

    /// Roll number or person code collided with a concurrent registration
    #[error("Enrollment identifier collision")]
    AllocationConflict,

    /// Invalid credentials (unknown email, role mismatch, or wrong password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session token has expired
    #[error("Session token expired")]
    TokenExpired,

    /// Session token is structurally invalid
    #[error("Session token malformed")]
    TokenMalformed,

    /// Session token signature does not verify
    #[error("Session token signature invalid")]
    TokenBadSignature,

    /// Store operation exceeded its deadline; transaction rolled back
    #[error("Storage operation timed out")]
    StoreTimeout,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentityError::EmailExists | IdentityError::AllocationConflict => StatusCode::CONFLICT,
            IdentityError::InvalidCredentials
            | IdentityError::TokenExpired
            | IdentityError::TokenMalformed
            | IdentityError::TokenBadSignature => StatusCode::UNAUTHORIZED,
            IdentityError::StoreTimeout
            | IdentityError::Database(_)
            | IdentityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Validation(_) => ErrorKind::BadRequest,
            IdentityError::EmailExists | IdentityError::AllocationConflict => ErrorKind::Conflict,
            IdentityError::InvalidCredentials
            | IdentityError::TokenExpired
            | IdentityError::TokenMalformed
            | IdentityError::TokenBadSignature => ErrorKind::Unauthorized,
            IdentityError::StoreTimeout
            | IdentityError::Database(_)
            | IdentityError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError with the externally visible message
    ///
    /// Token errors collapse to one message; which of Expired / Malformed /
    /// BadSignature occurred is logged, not returned. 5xx detail is only
    /// exposed in debug builds.
    pub fn to_app_error(&self) -> AppError {
        match self {
            IdentityError::TokenExpired
            | IdentityError::TokenMalformed
            | IdentityError::TokenBadSignature => {
                AppError::new(self.kind(), "Session token is invalid or expired")
            }
            IdentityError::StoreTimeout
            | IdentityError::Database(_)
            | IdentityError::Internal(_) => {
                if cfg!(debug_assertions) {
                    AppError::new(self.kind(), self.to_string())
                } else {
                    AppError::new(self.kind(), "An internal error occurred")
                }
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity database error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::StoreTimeout => {
                tracing::error!("Identity store operation timed out");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            IdentityError::TokenExpired
            | IdentityError::TokenMalformed
            | IdentityError::TokenBadSignature => {
                tracing::warn!(error = %self, "Session token rejected");
            }
            IdentityError::AllocationConflict => {
                tracing::warn!("Enrollment identifier collision");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => IdentityError::Validation(err.message().to_string()),
            _ => IdentityError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            IdentityError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IdentityError::EmailExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            IdentityError::AllocationConflict.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            IdentityError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IdentityError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IdentityError::StoreTimeout.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            IdentityError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_errors_share_external_message() {
        let expired = IdentityError::TokenExpired.to_app_error();
        let malformed = IdentityError::TokenMalformed.to_app_error();
        let bad_sig = IdentityError::TokenBadSignature.to_app_error();

        assert_eq!(expired.message(), malformed.message());
        assert_eq!(malformed.message(), bad_sig.message());
    }

    #[test]
    fn test_validation_from_app_error() {
        let err: IdentityError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, IdentityError::Validation(_)));
    }
}
