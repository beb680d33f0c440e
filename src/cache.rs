// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-local TTL cache shared by the HTTP handlers.
//!
//! Entries live under a composed `namespace|key` string and expire lazily:
//! nothing sweeps the map, a read at or after `expires_at` deletes the entry
//! and reports a miss. The cache is volatile and starts empty on every boot.

use chrono::{DateTime, Duration, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: DateTime<Utc>,
}

/// Namespaced in-memory cache with per-entry expiry.
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Clone)]
pub struct TtlCache {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    clock: Clock,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlCache {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Build a cache that reads time from `clock` instead of the wall clock
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock: Arc::new(clock),
        }
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{}|{}", namespace, key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry behind
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch a live value. Expired entries are removed and read as absent,
    /// as are entries stored with a different type.
    pub fn get<T>(&self, namespace: &str, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let full_key = Self::full_key(namespace, key);
        let now = (self.clock)();
        let mut entries = self.lock();

        let expired = match entries.get(&full_key) {
            None => return None,
            Some(entry) => now >= entry.expires_at,
        };
        if expired {
            entries.remove(&full_key);
            return None;
        }

        entries
            .get(&full_key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    /// Store a value for `ttl_seconds` (at least one second)
    pub fn set<T>(&self, namespace: &str, key: &str, value: T, ttl_seconds: u64)
    where
        T: Send + Sync + 'static,
    {
        let ttl = ttl_seconds.max(1);
        let expires_at = (self.clock)() + Duration::seconds(ttl as i64);
        let entry = CacheEntry {
            value: Arc::new(value),
            expires_at,
        };
        self.lock().insert(Self::full_key(namespace, key), entry);
    }

    /// Drop an entry regardless of its expiry. Returns whether one existed.
    pub fn invalidate(&self, namespace: &str, key: &str) -> bool {
        self.lock()
            .remove(&Self::full_key(namespace, key))
            .is_some()
    }

    /// Number of stored entries, including ones that expired but were not read yet
    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn manual_clock() -> (TtlCache, Arc<Mutex<DateTime<Utc>>>) {
        let now = Arc::new(Mutex::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        let handle = now.clone();
        let cache = TtlCache::with_clock(move || *handle.lock().unwrap());
        (cache, now)
    }

    fn advance(now: &Arc<Mutex<DateTime<Utc>>>, secs: i64) {
        let mut guard = now.lock().unwrap();
        *guard += Duration::seconds(secs);
    }

    #[test]
    fn test_get_before_expiry() {
        let (cache, now) = manual_clock();
        cache.set("faq", "all", vec!["a".to_string()], 10);
        advance(&now, 9);
        assert_eq!(
            cache.get::<Vec<String>>("faq", "all"),
            Some(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_absent_exactly_at_expiry() {
        let (cache, now) = manual_clock();
        cache.set("faq", "all", 42u32, 10);
        advance(&now, 10);
        assert_eq!(cache.get::<u32>("faq", "all"), None);
        // Lazily deleted on that read
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_absent_after_expiry() {
        let (cache, now) = manual_clock();
        cache.set("faq", "all", 42u32, 10);
        advance(&now, 3600);
        assert_eq!(cache.get::<u32>("faq", "all"), None);
    }

    #[test]
    fn test_zero_ttl_is_raised_to_one_second() {
        let (cache, now) = manual_clock();
        cache.set("ns", "k", 1u8, 0);
        assert_eq!(cache.get::<u8>("ns", "k"), Some(1));
        advance(&now, 1);
        assert_eq!(cache.get::<u8>("ns", "k"), None);
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let (cache, _) = manual_clock();
        cache.set("cta", "list", "cta".to_string(), 60);
        cache.set("featured", "list", "featured".to_string(), 60);
        assert_eq!(cache.get::<String>("cta", "list").as_deref(), Some("cta"));
        assert_eq!(
            cache.get::<String>("featured", "list").as_deref(),
            Some("featured")
        );
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let (cache, _) = manual_clock();
        cache.set("ns", "k", 7u64, 60);
        assert_eq!(cache.get::<String>("ns", "k"), None);
        assert_eq!(cache.get::<u64>("ns", "k"), Some(7));
    }

    #[test]
    fn test_overwrite_refreshes_expiry() {
        let (cache, now) = manual_clock();
        cache.set("ns", "k", 1u32, 10);
        advance(&now, 8);
        cache.set("ns", "k", 2u32, 10);
        advance(&now, 8);
        assert_eq!(cache.get::<u32>("ns", "k"), Some(2));
    }

    #[test]
    fn test_invalidate() {
        let (cache, _) = manual_clock();
        cache.set("page", "pricing", 1u32, 60);
        assert!(cache.invalidate("page", "pricing"));
        assert!(!cache.invalidate("page", "pricing"));
        assert_eq!(cache.get::<u32>("page", "pricing"), None);
    }

    #[test]
    fn test_clones_share_state() {
        let (cache, _) = manual_clock();
        let other = cache.clone();
        other.set("ns", "k", 5i32, 60);
        assert_eq!(cache.get::<i32>("ns", "k"), Some(5));
    }
}
