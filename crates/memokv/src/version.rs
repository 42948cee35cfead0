//! Version-token registry.
//!
//! One opaque token per function identity, stored under
//! `memoize:verhash:<identity>` with no expiry. Every cache key derives from
//! the current token, so overwriting it orphans all previously stored entries
//! for that function at once — no enumeration, no pattern delete. Orphaned
//! entries linger until the store's own TTL or eviction reclaims them.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::MemoResult;
use crate::key::verhash_key;
use crate::store::{CacheStore, Timeout};

/// Get-or-create / bump access to per-function version tokens.
#[derive(Clone)]
pub struct VersionRegistry {
    store: Arc<dyn CacheStore>,
}

impl VersionRegistry {
    /// Create a registry over the given store.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Read the current token for an identity, creating one on first access.
    ///
    /// Two concurrent calls racing on an absent token may both generate and
    /// write; the store resolves to one final value (last write wins). The
    /// losing token strands at most one transient entry, never serves stale
    /// data, so the race stays unsynchronized.
    pub async fn get_or_create(&self, identity: &str) -> MemoResult<String> {
        let key = verhash_key(identity);
        match self.store.get(&key).await? {
            Some(Value::String(token)) => Ok(token),
            Some(other) => {
                warn!(identity, stored = %other, "version token has unexpected shape; regenerating");
                self.write_fresh(identity, &key).await
            }
            None => self.write_fresh(identity, &key).await,
        }
    }

    /// Unconditionally replace the stored token, invalidating every key
    /// previously derived under the old one.
    pub async fn bump(&self, identity: &str) -> MemoResult<()> {
        let key = verhash_key(identity);
        let token = fresh_token();
        debug!(identity, "bumping version token");
        self.store
            .set(&key, Value::String(token), Timeout::Never)
            .await
    }

    async fn write_fresh(&self, identity: &str, key: &str) -> MemoResult<String> {
        let token = fresh_token();
        debug!(identity, "creating version token");
        self.store
            .set(key, Value::String(token.clone()), Timeout::Never)
            .await?;
        Ok(token)
    }
}

/// 128 bits of entropy, hex-encoded.
fn fresh_token() -> String {
    Uuid::new_v4().simple().to_string()
}
