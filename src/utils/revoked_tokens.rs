use moka::Expiry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

use crate::auth::jwt::now;

/// Access tokens stay valid until `exp`, so a logged-out token id is kept
/// here for exactly its remaining lifetime.
struct UntilTokenExpiry;

impl Expiry<String, u64> for UntilTokenExpiry {
    fn expire_after_create(&self, _jti: &String, remaining: &u64, _at: Instant) -> Option<Duration> {
        Some(Duration::from_secs(*remaining))
    }
}

/// jti => seconds left on the token when it was revoked
static REVOKED: Lazy<Cache<String, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(200_000)
        .expire_after(UntilTokenExpiry)
        .build()
});

/// Revoke an access token until its `exp` passes.
pub async fn revoke(jti: &str, exp: usize) {
    let remaining = exp.saturating_sub(now()) as u64;
    if remaining == 0 {
        return;
    }
    REVOKED.insert(jti.to_string(), remaining).await;
    log::debug!("Access token {} revoked for {}s", jti, remaining);
}

pub fn is_revoked(jti: &str) -> bool {
    REVOKED.contains_key(jti)
}
