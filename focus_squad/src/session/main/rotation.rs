use crate::utils::{UtilError, gen_random_hex};

const DEFAULT_ROLLING_MINUTES: f64 = 15.0;
const MIN_ROLLING_MINUTES: f64 = 5.0;
const MS_PER_MINUTE: f64 = 60_000.0;

/// Random hex session identifier of `byte_length` bytes (16 is the usual choice).
pub fn generate_session_id(byte_length: usize) -> Result<String, UtilError> {
    gen_random_hex(byte_length)
}

/// Rolling rotation interval in milliseconds for a configured number of minutes.
///
/// Missing, empty, unparseable or non-positive input yields 15 minutes; anything
/// else is clamped to at least 5 minutes.
pub fn resolve_session_rolling_interval(env_minutes: Option<&str>) -> i64 {
    let minutes = env_minutes
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|m| m.is_finite() && *m > 0.0)
        .unwrap_or(DEFAULT_ROLLING_MINUTES)
        .max(MIN_ROLLING_MINUTES);

    (minutes * MS_PER_MINUTE) as i64
}

/// Whether a session last issued at `last_issued_at` (unix ms) must get a new identifier.
pub fn needs_rolling_rotation(last_issued_at: Option<i64>, now: i64, interval_ms: i64) -> bool {
    match last_issued_at {
        Some(issued_at) if issued_at > 0 => now.saturating_sub(issued_at) >= interval_ms,
        _ => true,
    }
}
