//! Password Reset Tokens
//!
//! Generates the opaque tokens handed out by the password reset request flow. A
//! reset token is a bearer credential for changing an account's password,
//! so it is drawn from the operating system CSPRNG rather than any seeded
//! or time-derived generator.
//!
//! Tokens are 32 alphanumeric characters (62^32, roughly 190 bits of
//! entropy) and are stored alongside an expiry timestamp on the user row.
//! A token is single-use: completing a reset clears it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// Length in characters of a generated reset token.
pub const RESET_TOKEN_LEN: usize = 32;

/// Default validity window for a reset token.
pub const DEFAULT_RESET_TTL: Duration = Duration::from_secs(60 * 60);

/// A freshly generated reset token and its expiry.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Generate a new token valid for `ttl` from now.
    pub fn generate(ttl: Duration) -> Self {
        let token: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LEN)
            .map(char::from)
            .collect();

        Self {
            token,
            expires_at: Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(1)),
        }
    }
}

/// Whether a stored expiry timestamp is still in the future.
pub fn is_live(expires_at: DateTime<Utc>) -> bool {
    expires_at > Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let reset = ResetToken::generate(DEFAULT_RESET_TTL);
        assert_eq!(reset.token.len(), RESET_TOKEN_LEN);
        assert!(reset.token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = ResetToken::generate(DEFAULT_RESET_TTL);
        let b = ResetToken::generate(DEFAULT_RESET_TTL);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expiry_window() {
        let reset = ResetToken::generate(Duration::from_secs(3600));
        let remaining = reset.expires_at - Utc::now();
        assert!(remaining.num_seconds() > 3500);
        assert!(remaining.num_seconds() <= 3600);
        assert!(is_live(reset.expires_at));
    }

    #[test]
    fn test_past_expiry_is_dead() {
        assert!(!is_live(Utc::now() - chrono::Duration::seconds(1)));
    }
}
