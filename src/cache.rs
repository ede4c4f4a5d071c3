use std::num::NonZeroUsize;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use crate::error::TrackerError;

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Clone, Debug)]
struct CachedEntry {
    data: String,
    stored_at: i64,
}

/// Bounded LRU of serialized responses keyed by a caller-supplied
/// fingerprint (the advice collaborator uses the goal's SHA-256 digest).
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CachedEntry>>,
}

impl ResponseCache {
    /// A capacity of zero falls back to 64 entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get(key) else {
            tracing::debug!(key = short(key), "Cache miss");
            return None;
        };
        match serde_json::from_str::<T>(&entry.data) {
            Ok(parsed) => {
                tracing::debug!(key = short(key), stored_at = entry.stored_at, "Cache hit");
                Some(parsed)
            }
            Err(e) => {
                tracing::warn!(key = short(key), error = %e, "Dropping unreadable cache entry");
                entries.pop(key);
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), TrackerError> {
        let data = serde_json::to_string(value).map_err(|e| {
            TrackerError::new(format!("Failed to serialize response for cache: {}", e), "json_serialize")
        })?;
        self.entries.lock().put(
            key.to_string(),
            CachedEntry {
                data,
                stored_at: chrono::Utc::now().timestamp(),
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResponseCache::new(2);
        cache.put("a", &1u32).unwrap();
        cache.put("b", &2u32).unwrap();
        assert_eq!(cache.get::<u32>("a"), Some(1));
        cache.put("c", &3u32).unwrap();
        assert_eq!(cache.get::<u32>("b"), None);
        assert_eq!(cache.get::<u32>("a"), Some(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn wrong_type_is_a_miss_and_evicted() {
        let cache = ResponseCache::new(0);
        cache.put("k", &"text").unwrap();
        assert_eq!(cache.get::<u32>("k"), None);
        assert!(cache.is_empty());
    }
}
