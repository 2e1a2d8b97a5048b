//! Error Handling
//!
//! Central error type for the HTTP surface. Every handler returns
//! `Result<_, AppError>`; the [`IntoResponse`] impl maps the error kind to a
//! status code and renders the standard failure envelope:
//!
//! ```json
//! { "success": false, "message": "Invalid email or password" }
//! ```
//!
//! Internal errors are logged with their full detail but clients only ever
//! see a generic message, so database or hashing failures never leak schema
//! or implementation detail. In development mode the logged detail is also
//! included in the response body to keep debugging fast.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

// ============================================================================
// Error Configuration
// ============================================================================

/// Error handling configuration
#[derive(Debug, Clone)]
pub struct ErrorConfig {
    /// Whether to expose internal error details in responses.
    /// Must be `false` in production.
    pub expose_details: bool,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl ErrorConfig {
    pub fn production() -> Self {
        Self {
            expose_details: false,
        }
    }

    pub fn development() -> Self {
        Self {
            expose_details: true,
        }
    }
}

// Global configuration (set once at startup)
static ERROR_CONFIG: std::sync::OnceLock<ErrorConfig> = std::sync::OnceLock::new();

/// Initialize error handling. Call once at application startup.
pub fn init(config: ErrorConfig) {
    let _ = ERROR_CONFIG.set(config);
}

/// Get the current error configuration
pub fn config() -> &'static ErrorConfig {
    ERROR_CONFIG.get_or_init(ErrorConfig::default)
}

// ============================================================================
// Error Types
// ============================================================================

/// Application error with a safe client message and logged internal detail.
#[derive(Debug)]
pub struct AppError {
    /// Error kind determines HTTP status and handling
    pub kind: ErrorKind,
    /// User-facing message (safe to expose)
    pub message: String,
    /// Internal details (logged, not exposed in production)
    pub details: Option<String>,
    /// Original error (for logging)
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Error categories with appropriate HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request (400) - client error, safe to expose message
    BadRequest,
    /// Unauthorized (401) - authentication required or failed
    Unauthorized,
    /// Not found (404) - resource doesn't exist
    NotFound,
    /// Conflict (409) - resource state conflict
    Conflict,
    /// Internal server error (500) - hide details
    Internal,
    /// Service unavailable (503) - temporary failure
    Unavailable,
}

impl ErrorKind {
    /// Get the HTTP status code for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether the message is safe to pass through untouched
    pub fn expose_message(&self) -> bool {
        !matches!(self, Self::Internal | Self::Unavailable)
    }
}

impl AppError {
    /// Create a new error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Create an unauthorized error (401)
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error (409)
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error (500) with source
    ///
    /// The message is what users see; the source is logged but not exposed.
    pub fn internal(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
            details: Some(source.to_string()),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error without a source
    pub fn internal_msg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Log the error (called automatically by IntoResponse)
    fn log(&self) {
        let details = self.details.as_deref().unwrap_or("none");

        match self.kind {
            ErrorKind::Internal | ErrorKind::Unavailable => {
                tracing::error!(
                    error_kind = %self.kind,
                    message = %self.message,
                    details = %details,
                    "Internal error"
                );
            }
            ErrorKind::Unauthorized => {
                tracing::warn!(
                    error_kind = %self.kind,
                    message = %self.message,
                    "Auth error"
                );
            }
            _ => {
                tracing::debug!(
                    error_kind = %self.kind,
                    message = %self.message,
                    "Client error"
                );
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Internal => write!(f, "internal_error"),
            Self::Unavailable => write!(f, "service_unavailable"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// JSON failure envelope
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Error details (development only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let cfg = config();
        let status = self.kind.status_code();

        let message = if cfg.expose_details || self.kind.expose_message() {
            self.message.clone()
        } else {
            "An internal error occurred".to_string()
        };

        let response = ErrorResponse {
            success: false,
            message,
            details: if cfg.expose_details {
                self.details
            } else {
                None
            },
        };

        (status, Json(response)).into_response()
    }
}

// ============================================================================
// Conversions from common error types
// ============================================================================

impl From<crate::validation::ValidationError> for AppError {
    fn from(err: crate::validation::ValidationError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<crate::password::PasswordError> for AppError {
    fn from(err: crate::password::PasswordError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<crate::service::AuthError> for AppError {
    fn from(err: crate::service::AuthError) -> Self {
        use crate::service::AuthError;

        match err {
            AuthError::EmailTaken => AppError::conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::InvalidRefreshToken => {
                AppError::unauthorized(err.to_string())
            }
            AuthError::UserNotFound => AppError::not_found(err.to_string()),
            AuthError::InvalidResetToken => AppError::bad_request(err.to_string()),
            AuthError::Directory(e) => AppError::internal("Something went wrong", e),
            AuthError::Hash(e) => AppError::internal("Something went wrong", e),
            AuthError::Token(e) => AppError::internal("Something went wrong", e),
            AuthError::Internal(msg) => AppError::internal_msg(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_messages_not_exposed() {
        assert!(!ErrorKind::Internal.expose_message());
        assert!(!ErrorKind::Unavailable.expose_message());
        assert!(ErrorKind::BadRequest.expose_message());
        assert!(ErrorKind::Unauthorized.expose_message());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let response = ErrorResponse {
            success: false,
            message: "Invalid email or password".into(),
            details: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"success":false,"message":"Invalid email or password"}"#
        );
    }

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err = crate::validation::validate_required("", "email").unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.kind, ErrorKind::BadRequest);
    }
}
