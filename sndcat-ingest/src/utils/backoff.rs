//! Backoff arithmetic for the asset lookup retry loop
//!
//! **Backoff Strategy:**
//! - Delay for attempt `n` (0-based): `base_delay * 2^n`
//! - A numeric `Retry-After` hint (seconds) replaces the computed delay verbatim
//! - Arithmetic saturates instead of overflowing for large attempt counts

use std::time::Duration;

/// Exponential delay for a 0-based attempt number
pub fn exponential_delay(base_delay: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base_delay.saturating_mul(factor)
}

/// Parse a `Retry-After` header value given in seconds
///
/// Returns `None` for missing, non-numeric, zero, negative or non-finite
/// values, in which case the caller falls back to [`exponential_delay`].
/// HTTP-date values are not supported and also yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(seconds).ok()
}
