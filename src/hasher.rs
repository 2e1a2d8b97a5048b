//! Credential Hashing
//!
//! One-way password hashing built on bcrypt. The digest embeds its own salt
//! and cost factor, so `verify` needs no extra state and old digests remain
//! verifiable after a cost change.
//!
//! # Usage
//!
//! ```
//! use portcullis::hasher::PasswordHasher;
//!
//! let hasher = PasswordHasher::default();
//! let digest = hasher.hash("hunter2hunter2").unwrap();
//! assert!(hasher.verify("hunter2hunter2", &digest));
//! assert!(!hasher.verify("wrong", &digest));
//! ```
//!
//! Hashing is deliberately expensive (tunable work factor). Call sites on the
//! request path must run it via `tokio::task::spawn_blocking` so a slow hash
//! does not stall unrelated requests; [`crate::service::AccountService`] does
//! this.

use thiserror::Error;

/// Default bcrypt work factor. 2^10 rounds keeps hashing around tens of
/// milliseconds on current hardware.
pub const DEFAULT_COST: u32 = 10;

/// Smallest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Largest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hashing failure. bcrypt only fails on pathological input (e.g. interior
/// NUL bytes), but the error still propagates rather than panicking.
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(#[from] bcrypt::BcryptError);

/// Salted, adaptive one-way hasher for passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// Create a hasher with an explicit work factor.
    ///
    /// The cost is clamped to bcrypt's supported range (4..=31).
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    /// Hash a plaintext password. A fresh random salt is drawn per call, so
    /// hashing the same password twice yields different digests.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// Returns `false` on mismatch and on malformed digests; verification
    /// never surfaces an error to callers, so a corrupt stored hash behaves
    /// like a wrong password.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        bcrypt::verify(plaintext, digest).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // MIN_COST keeps the test suite fast; the work factor does not change
    // verification semantics.
    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST)
    }

    #[test]
    fn test_hash_roundtrip() {
        let hasher = fast_hasher();
        let digest = hasher.hash("correct horse battery").unwrap();

        assert!(hasher.verify("correct horse battery", &digest));
        assert!(!hasher.verify("correct horse batterx", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn test_digest_never_contains_plaintext() {
        let hasher = fast_hasher();
        let digest = hasher.hash("longenough1").unwrap();
        assert!(!digest.contains("longenough1"));
    }

    #[test]
    fn test_unique_salts() {
        let hasher = fast_hasher();
        let a = hasher.hash("same password").unwrap();
        let b = hasher.hash("same password").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same password", &a));
        assert!(hasher.verify("same password", &b));
    }

    #[test]
    fn test_malformed_digest_is_mismatch() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("anything", "not-a-bcrypt-digest"));
        assert!(!hasher.verify("anything", ""));
    }

    #[test]
    fn test_cost_clamped() {
        // Out-of-range costs must not panic at hash time. A cost above the
        // ceiling clamps down instead of hashing for hours, so we can only
        // exercise the low side end to end.
        let hasher = PasswordHasher::new(1);
        let digest = hasher.hash("pw").unwrap();
        assert!(hasher.verify("pw", &digest));
        assert!(digest.starts_with("$2"));
        assert!(digest.contains("$04$"));
    }
}
