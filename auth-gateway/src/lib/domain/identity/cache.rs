use std::time::Duration;

use auth::Claims;
use moka::future::Cache;

/// Decoded claims remembered for a raw token string.
#[derive(Debug, Clone)]
pub struct ValidationCacheEntry {
    pub claims: Claims,
    pub cached_at: i64,
}

/// Shared cache of successful token validations.
///
/// Entries age out after a time-to-live shorter than the token lifetime and
/// are evicted explicitly when their token is refreshed. A hit is never
/// served for a token whose own expiry has passed since it was cached.
pub struct ValidationCache {
    entries: Cache<String, ValidationCacheEntry>,
}

impl ValidationCache {
    pub fn new(time_to_live: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(time_to_live)
            .build();

        Self { entries }
    }

    /// Cached claims for `token`, if present and still unexpired at `now`.
    pub async fn get(&self, token: &str, now: i64) -> Option<Claims> {
        let entry = self.entries.get(token).await?;

        if entry.claims.is_expired(now) {
            tracing::debug!(
                cached_at = entry.cached_at,
                expires_at = entry.claims.exp,
                "Dropping cached validation for expired token"
            );
            self.entries.invalidate(token).await;
            return None;
        }

        Some(entry.claims)
    }

    pub async fn insert(&self, token: &str, claims: Claims, now: i64) {
        self.entries
            .insert(
                token.to_string(),
                ValidationCacheEntry {
                    claims,
                    cached_at: now,
                },
            )
            .await;
    }

    pub async fn invalidate(&self, token: &str) {
        self.entries.invalidate(token).await;
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }
}
