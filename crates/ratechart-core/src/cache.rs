//! In-memory cache of per-day upstream answers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::CalendarDay;

/// How an adapter uses its [`DayCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve fresh entries from the cache, fetch and store otherwise.
    #[default]
    Use,
    /// Always fetch, then store the new answer.
    Refresh,
    /// Neither read nor write the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        !matches!(self, Self::Bypass)
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

/// Thread-safe map from calendar day to a cached value with a TTL.
#[derive(Debug, Clone)]
pub struct DayCache<T> {
    entries: Arc<tokio::sync::RwLock<HashMap<CalendarDay, Entry<T>>>>,
    ttl: Duration,
}

impl<T: Clone> DayCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// A zero TTL disables the cache.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.ttl.is_zero()
    }

    pub async fn get(&self, day: CalendarDay) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(&day)
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub async fn put(&self, day: CalendarDay, value: T) {
        if self.is_disabled() {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .write()
            .await
            .insert(day, Entry { value, expires_at });
    }

    /// Drops expired entries and returns how many were dropped.
    pub async fn clear_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, expired ones included.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(raw: &str) -> CalendarDay {
        CalendarDay::parse(raw).expect("valid day")
    }

    #[tokio::test]
    async fn stores_and_overwrites_per_day() {
        let cache = DayCache::new(Duration::from_secs(60));
        assert!(cache.get(day("2024-01-02")).await.is_none());

        cache.put(day("2024-01-02"), Some(89.5)).await;
        assert_eq!(cache.get(day("2024-01-02")).await, Some(Some(89.5)));

        cache.put(day("2024-01-02"), None).await;
        assert_eq!(cache.get(day("2024-01-02")).await, Some(None));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = DayCache::new(Duration::from_millis(50));
        cache.put(day("2024-01-02"), 1_u8).await;

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get(day("2024-01-02")).await.is_none());
        assert_eq!(cache.clear_expired().await, 1);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn disabled_cache_stores_nothing() {
        let cache = DayCache::disabled();
        cache.put(day("2024-01-02"), 1_u8).await;
        assert!(cache.get(day("2024-01-02")).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[test]
    fn modes_control_reads_and_writes() {
        assert!(CacheMode::Use.reads() && CacheMode::Use.writes());
        assert!(!CacheMode::Refresh.reads() && CacheMode::Refresh.writes());
        assert!(!CacheMode::Bypass.reads() && !CacheMode::Bypass.writes());
    }
}
