use std::env;
use std::sync::LazyLock;

/// Header carrying the signature of machine-to-machine admin calls
pub const INTERNAL_ADMIN_SIGNATURE_HEADER: &str = "x-internal-admin-signature";

/// Largest accepted distance between a signature's timestamp and now, in seconds
pub(super) static INTERNAL_SIGNATURE_MAX_AGE_SECS: LazyLock<i64> = LazyLock::new(|| {
    env::var("INTERNAL_SIGNATURE_MAX_AGE_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(300)
});
