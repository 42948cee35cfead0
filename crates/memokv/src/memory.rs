//! In-process store backend.
//!
//! Per-entry expiry with lazy pruning on read. This is the convenience
//! default for [`crate::engine::Memoizer::in_memory`] and the backend the
//! test suite runs against; production deployments inject their own
//! [`CacheStore`] over a real key-value service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MemoResult;
use crate::store::{CacheStore, Timeout};

/// Default entry TTL (5 minutes).
const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    /// `None` means the entry never expires.
    expires_at: Option<Instant>,
}

/// In-memory [`CacheStore`] backend.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    default_ttl: Duration,
}

impl MemoryStore {
    /// Create a store with the default TTL for `Timeout::Default` writes.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Create a store resolving `Timeout::Default` to the given duration.
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|e| e.expires_at.is_none_or(|at| at > now))
            .count()
    }

    /// Whether the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().expect("memory store mutex poisoned")
    }

    fn expiry(&self, timeout: Timeout) -> Option<Instant> {
        match timeout {
            Timeout::Default => Some(Instant::now() + self.default_ttl),
            Timeout::Seconds(secs) => Some(Instant::now() + Duration::from_secs(secs)),
            Timeout::Never => None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> MemoResult<Option<Value>> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) => {
                if entry.expires_at.is_some_and(|at| at <= Instant::now()) {
                    entries.remove(key);
                    Ok(None)
                } else {
                    Ok(Some(entry.value.clone()))
                }
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, timeout: Timeout) -> MemoResult<()> {
        let entry = Entry {
            value,
            expires_at: self.expiry(timeout),
        };
        self.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> MemoResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}
