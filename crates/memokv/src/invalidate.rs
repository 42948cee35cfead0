//! Invalidation of memoized entries.
//!
//! Two granularities: delete the single entry for one normalized call, or
//! invalidate an entire function by bumping its version token. A bump makes
//! every key derived under the old token permanently unreachable without
//! enumerating or scanning anything — the orphaned entries age out under the
//! store's own TTL or eviction.

use tracing::debug;

use crate::args::CallArgs;
use crate::engine::{Memoized, Memoizer};
use crate::error::MemoResult;
use crate::key::derive_key;

impl Memoizer {
    /// Invalidate with the original dispatch rule: no arguments at all means
    /// "the entire function" (version bump); any argument means "this one
    /// normalized call".
    ///
    /// For a function that genuinely declares zero parameters the two
    /// spellings coincide here, and this method bumps. Callers who need the
    /// single-entry deletion for such a function use
    /// [`Memoizer::delete_memoized_entry`].
    pub async fn delete_memoized(&self, func: &Memoized, args: CallArgs) -> MemoResult<()> {
        if args.is_empty() {
            self.delete_memoized_all(func).await
        } else {
            self.delete_memoized_entry(func, args).await
        }
    }

    /// Delete the cached entry for one normalized call, leaving every other
    /// entry of the function servable.
    ///
    /// Obtaining the current version may lazily create a token for a
    /// never-called function; that is harmless. Deleting an absent key is a
    /// no-op.
    pub async fn delete_memoized_entry(&self, func: &Memoized, args: CallArgs) -> MemoResult<()> {
        let identity = func.spec().identity();
        let normalized = func.spec().bind(&args)?;
        let version = self.versions().get_or_create(identity).await?;
        let key = derive_key(identity, &normalized, &version);
        debug!(identity, %key, "deleting memoized entry");
        self.store().delete(&key).await
    }

    /// Invalidate every cached entry of the function, regardless of
    /// arguments, by bumping its version token.
    pub async fn delete_memoized_all(&self, func: &Memoized) -> MemoResult<()> {
        self.versions().bump(func.spec().identity()).await
    }
}
