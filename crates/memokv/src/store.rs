//! The key-value store capability consumed by the memoizer.
//!
//! The memoizer treats the store as offering nothing stronger than atomic
//! single-key `get` / `set` / `delete`. The composite get-then-compute-then-set
//! sequence in the engine is deliberately not transactional; see
//! [`crate::engine`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MemoResult;

/// Expiry policy for a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// The store's own default TTL.
    #[default]
    Default,
    /// Expire after this many seconds.
    Seconds(u64),
    /// Never expire. Version tokens are stored with this policy.
    Never,
}

/// Atomic single-key store operations.
///
/// Implementations decide what `Timeout::Default` resolves to. Errors
/// propagate unchanged to the memoizer's caller; resilience such as retry or
/// fallback belongs to the implementation, not this interface.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a key. `None` is the absence sentinel, distinct from any stored
    /// value.
    async fn get(&self, key: &str) -> MemoResult<Option<Value>>;

    /// Write a key with the given expiry policy, overwriting any previous
    /// value.
    async fn set(&self, key: &str, value: Value, timeout: Timeout) -> MemoResult<()>;

    /// Delete a key. Deleting an absent key is a no-op, not an error.
    async fn delete(&self, key: &str) -> MemoResult<()>;
}
