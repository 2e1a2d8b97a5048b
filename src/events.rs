//! Security Event Logging
//!
//! Structured logging for the security-relevant events of the account
//! lifecycle. Every event is emitted through [`security_event!`] so log
//! aggregation can filter on the `security_event`, `category`, and
//! `severity` fields regardless of which handler produced the record.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::events::SecurityEvent;
//! use portcullis::security_event;
//!
//! security_event!(
//!     SecurityEvent::AuthenticationSuccess,
//!     user_id = %user.id,
//!     "User authenticated"
//! );
//! ```

use std::fmt;

/// Security event categories for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    // Authentication events
    /// Successful user authentication
    AuthenticationSuccess,
    /// Failed authentication attempt
    AuthenticationFailure,
    /// Access token pair refreshed
    TokenRefreshed,
    /// Presented token failed verification
    TokenRejected,

    // User management events
    /// New user registered
    UserRegistered,
    /// Password reset requested
    PasswordResetRequested,
    /// Password changed via reset
    PasswordChanged,
}

impl SecurityEvent {
    /// Get the event category for filtering/grouping
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess
            | Self::AuthenticationFailure
            | Self::TokenRefreshed
            | Self::TokenRejected => "authentication",

            Self::UserRegistered
            | Self::PasswordResetRequested
            | Self::PasswordChanged => "user_management",
        }
    }

    /// Get the severity level for the event
    pub fn severity(&self) -> Severity {
        match self {
            // High - security-relevant failures
            Self::AuthenticationFailure | Self::TokenRejected => Severity::High,

            // Medium - important state changes
            Self::AuthenticationSuccess
            | Self::UserRegistered
            | Self::PasswordResetRequested
            | Self::PasswordChanged => Severity::Medium,

            // Low - routine operations
            Self::TokenRefreshed => Severity::Low,
        }
    }

    /// Get the event name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::TokenRefreshed => "token_refreshed",
            Self::TokenRejected => "token_rejected",
            Self::UserRegistered => "user_registered",
            Self::PasswordResetRequested => "password_reset_requested",
            Self::PasswordChanged => "password_changed",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
    /// Immediate attention required
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Log a security event with structured fields.
///
/// The macro automatically includes the `security_event`, `category`, and
/// `severity` fields and picks the tracing level from the event's severity.
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let severity = event.severity();
        let category = event.category();
        let event_name = event.name();

        match severity {
            $crate::events::Severity::Critical => {
                ::tracing::error!(
                    security_event = event_name,
                    category = category,
                    severity = "critical",
                    $($field)*
                );
            }
            $crate::events::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::events::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::events::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(SecurityEvent::AuthenticationFailure.category(), "authentication");
        assert_eq!(SecurityEvent::TokenRejected.category(), "authentication");
        assert_eq!(SecurityEvent::UserRegistered.category(), "user_management");
        assert_eq!(SecurityEvent::PasswordChanged.category(), "user_management");
    }

    #[test]
    fn test_severities() {
        assert_eq!(SecurityEvent::AuthenticationFailure.severity(), Severity::High);
        assert_eq!(SecurityEvent::AuthenticationSuccess.severity(), Severity::Medium);
        assert_eq!(SecurityEvent::TokenRefreshed.severity(), Severity::Low);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(SecurityEvent::PasswordResetRequested.to_string(), "password_reset_requested");
        assert_eq!(Severity::High.to_string(), "high");
    }

    #[test]
    fn test_macro_compiles_with_fields() {
        security_event!(
            SecurityEvent::AuthenticationSuccess,
            user_id = "00000000-0000-0000-0000-000000000000",
            "User authenticated"
        );
    }
}
