//! Cryptographic comparison helpers
//!
//! Reset tokens are bearer secrets: comparing them with `==` would leak
//! information through timing, since string equality bails out at the first
//! mismatching byte. The `subtle` crate gives us a comparison whose running
//! time does not depend on where the inputs differ.

use subtle::ConstantTimeEq;

/// Compare two byte slices in constant time.
///
/// Slices of different lengths compare unequal; the length check itself is
/// not secret here (reset tokens have a fixed, public length).
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Constant-time comparison for strings. See [`constant_time_eq`].
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
