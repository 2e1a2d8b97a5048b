//! Password Policy
//!
//! Length-based policy for user-chosen passwords, applied at registration
//! and at password reset. Follows modern guidance: a real minimum, a high
//! maximum to allow passphrases, and no composition rules (mandatory
//! uppercase/special characters reduce security in practice).

use thiserror::Error;

/// Why a candidate password was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters long")]
    TooShort(usize),
    #[error("Password must be at most {0} characters long")]
    TooLong(usize),
}

/// Password policy configuration
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length (kept high to support passphrases)
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password against this policy.
    pub fn validate(&self, password: &str) -> Result<(), PasswordError> {
        let len = password.chars().count();
        if len < self.min_length {
            return Err(PasswordError::TooShort(self.min_length));
        }
        if len > self.max_length {
            return Err(PasswordError::TooLong(self.max_length));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.min_length, 8);
        assert_eq!(policy.max_length, 128);
    }

    #[test]
    fn test_accepts_in_range() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("eightch8").is_ok());
        assert!(policy.validate(&"p".repeat(128)).is_ok());
    }

    #[test]
    fn test_rejects_short() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("seven77"),
            Err(PasswordError::TooShort(8))
        );
    }

    #[test]
    fn test_rejects_long() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate(&"p".repeat(129)),
            Err(PasswordError::TooLong(128))
        );
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let policy = PasswordPolicy::default();
        // 8 characters even though it is more than 8 bytes
        assert!(policy.validate("pässwörd").is_ok());
    }
}
