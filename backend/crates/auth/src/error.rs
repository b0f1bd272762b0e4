//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Every response body carries an
//! `error` string; validation failures additionally enumerate every
//! violated rule, and the 2FA-challenge outcome carries the challenge
//! metadata the client needs to continue the login.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordPolicyError;
use thiserror::Error;

use crate::domain::value_object::second_factor::SecondFactorKind;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing request input
    #[error("{0}")]
    InvalidInput(String),

    /// Password failed the strength policy; carries every violated rule
    #[error("Password does not meet requirements")]
    PasswordPolicy(Vec<PasswordPolicyError>),

    /// Duplicate email at signup
    #[error("User with this email already exists")]
    EmailTaken,

    /// Wrong email or wrong password; one message for both
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Credentials were valid but a second-factor code is needed
    #[error("Two-factor authentication required")]
    TwoFactorRequired {
        kind: SecondFactorKind,
        code_sent: bool,
    },

    /// Invalid 2FA code
    #[error("Invalid two-factor authentication code")]
    InvalidTwoFactorCode,

    /// Email code past its 10-minute window
    #[error("Two-factor authentication code has expired")]
    TwoFactorCodeExpired,

    /// 2FA material missing for the requested kind
    #[error("Two-factor authentication not set up")]
    TwoFactorNotSetup,

    /// Server-initiated resend only applies to email-kind 2FA
    #[error("TOTP authentication does not require email codes")]
    ResendNotSupported,

    /// Unknown principal
    #[error("User not found")]
    UserNotFound,

    /// The notification gateway failed to deliver the code
    #[error("Failed to send verification email")]
    EmailSendFailed(#[from] platform::mailer::MailerError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Trading-token cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_)
            | AuthError::PasswordPolicy(_)
            | AuthError::TwoFactorNotSetup
            | AuthError::ResendNotSupported => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::TwoFactorRequired { .. }
            | AuthError::InvalidTwoFactorCode
            | AuthError::TwoFactorCodeExpired => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::EmailSendFailed(_)
            | AuthError::Database(_)
            | AuthError::Cache(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_)
            | AuthError::PasswordPolicy(_)
            | AuthError::TwoFactorNotSetup
            | AuthError::ResendNotSupported => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::TwoFactorRequired { .. }
            | AuthError::InvalidTwoFactorCode
            | AuthError::TwoFactorCodeExpired => ErrorKind::Unauthorized,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::EmailSendFailed(_)
            | AuthError::Database(_)
            | AuthError::Cache(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Client-facing message. Dependency errors never leak internal detail.
    fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Cache(_) | AuthError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Cache(e) => {
                tracing::error!(error = %e, "Trading token cache error");
            }
            AuthError::EmailSendFailed(e) => {
                tracing::error!(error = %e, "2FA email delivery failed");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidTwoFactorCode | AuthError::TwoFactorCodeExpired => {
                tracing::warn!("Second-factor verification failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = match &self {
            AuthError::PasswordPolicy(violations) => {
                let details: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                serde_json::json!({
                    "error": self.client_message(),
                    "details": details,
                })
            }
            AuthError::TwoFactorRequired { kind, code_sent } => {
                let mut body = serde_json::json!({
                    "error": self.client_message(),
                    "requires2FA": true,
                    "twoFactorType": kind,
                });
                if *code_sent {
                    body["codeSent"] = serde_json::Value::Bool(true);
                }
                body
            }
            _ => serde_json::json!({ "error": self.client_message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::InvalidInput(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<crate::domain::token::TokenError> for AuthError {
    fn from(err: crate::domain::token::TokenError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::UserNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dependency_errors_do_not_leak_detail() {
        let err = AuthError::Internal("pool exhausted at 10.0.0.3".into());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_credential_errors_share_one_message() {
        // Unknown email and wrong password must be indistinguishable
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
