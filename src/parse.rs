//! Parsing utilities for human-readable configuration values

use std::time::Duration;

/// Parse a duration string (e.g., "30s", "15m", "1h", "7d")
///
/// Token TTLs in the environment use the short suffix form (`JWT_EXPIRES_IN=1d`).
/// Bare numbers are treated as seconds. Falls back to the provided default when
/// the value does not parse.
pub fn parse_duration(s: &str, default: Duration) -> Duration {
    let s = s.trim().to_lowercase();
    let (num_str, multiplier) = if s.ends_with("ms") {
        (&s[..s.len() - 2], 1)
    } else if s.ends_with('s') {
        (&s[..s.len() - 1], 1000)
    } else if s.ends_with('m') {
        (&s[..s.len() - 1], 60 * 1000)
    } else if s.ends_with('h') {
        (&s[..s.len() - 1], 60 * 60 * 1000)
    } else if s.ends_with('d') {
        (&s[..s.len() - 1], 24 * 60 * 60 * 1000)
    } else {
        (s.as_str(), 1000)
    };

    num_str
        .trim()
        .parse::<u64>()
        .map(|n| Duration::from_millis(n * multiplier))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: Duration = Duration::from_secs(30);

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("100ms", FALLBACK), Duration::from_millis(100));
        assert_eq!(parse_duration("30s", FALLBACK), Duration::from_secs(30));
        assert_eq!(parse_duration("15m", FALLBACK), Duration::from_secs(900));
        assert_eq!(parse_duration("1h", FALLBACK), Duration::from_secs(3600));
        assert_eq!(parse_duration("1d", FALLBACK), Duration::from_secs(86_400));
        assert_eq!(parse_duration("7d", FALLBACK), Duration::from_secs(7 * 86_400));
        assert_eq!(parse_duration("60", FALLBACK), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_duration_fallback() {
        assert_eq!(parse_duration("not-a-duration", FALLBACK), FALLBACK);
        assert_eq!(parse_duration("", FALLBACK), FALLBACK);
    }
}
