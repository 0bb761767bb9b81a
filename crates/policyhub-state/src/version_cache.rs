//! Time-limited cache of policy version lists.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use policyhub_model::Policy;
use tokio::time::Instant;

/// How long a cached version list stays valid.
pub const VERSION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct Entry {
    versions: Vec<Policy>,
    stored_at: Instant,
}

/// Policy name to version list, each entry valid for a fixed TTL.
///
/// Expired entries are treated as misses; they are replaced by the next
/// [`set`](Self::set) for the same name.
#[derive(Debug)]
pub struct VersionCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for VersionCache {
    fn default() -> Self {
        Self::with_ttl(VERSION_CACHE_TTL)
    }
}

impl VersionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached versions of `name`, if stored less than one TTL ago.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec<Policy>> {
        let entries = self.entries.lock();
        let entry = entries.get(name)?;
        if entry.stored_at.elapsed() < self.ttl {
            tracing::debug!(policy = name, "version cache hit");
            Some(entry.versions.clone())
        } else {
            tracing::debug!(policy = name, "version cache entry expired");
            None
        }
    }

    /// Stores `versions` for `name`, replacing any earlier entry.
    pub fn set(&self, name: &str, versions: Vec<Policy>) {
        self.entries.lock().insert(
            name.to_string(),
            Entry {
                versions,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions() -> Vec<Policy> {
        vec![Policy::new("cors", "1.0", "WSO2")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_until_ttl() {
        let cache = VersionCache::new();
        cache.set("cors", versions());

        tokio::time::advance(VERSION_CACHE_TTL - Duration::from_millis(1)).await;
        assert!(cache.get("cors").is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get("cors").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_and_restarts_clock() {
        let cache = VersionCache::new();
        cache.set("cors", versions());
        tokio::time::advance(Duration::from_secs(200)).await;

        let mut newer = versions();
        newer.push(Policy::new("cors", "2.0", "WSO2"));
        cache.set("cors", newer);
        tokio::time::advance(Duration::from_secs(200)).await;

        assert_eq!(cache.get("cors").map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_miss_for_unknown_name() {
        assert!(VersionCache::new().get("nope").is_none());
    }
}
