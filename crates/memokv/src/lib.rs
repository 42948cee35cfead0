//! Function memoization backed by a key-value cache store, with O(1)
//! versioned invalidation.
//!
//! Every cached result lives under a single deterministic key derived from
//! `(function identity, normalized arguments, version token)`. Invalidating
//! one call deletes one key; invalidating a whole function overwrites its
//! version token, which re-keys every future call and orphans all prior
//! entries at once — no bulk delete, no pattern delete, no key enumeration
//! required of the store.
//!
//! # Quick Start
//!
//! ```no_run
//! use memokv::{CallArgs, FuncSpec, Memoizer, Timeout};
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let memoizer = Memoizer::in_memory();
//!
//! let add = memoizer.memoize(Timeout::Seconds(60)).wrap_fn(
//!     FuncSpec::new("myapp.add").param("a").param_with_default("b", 10),
//!     |_args| Ok(json!(3)),
//! );
//!
//! // First call computes; the second is served from the store.
//! let sum = add.call(CallArgs::none().arg(1).kwarg("b", 2)).await?;
//!
//! // One normalized call, or the whole function.
//! memoizer.delete_memoized(&add, CallArgs::none().arg(1).kwarg("b", 2)).await?;
//! memoizer.delete_memoized_all(&add).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Caveats carried on purpose
//!
//! - A `Value::Null` result is never stored, so calls producing it recompute
//!   every time ("absence-sentinel gap").
//! - Concurrent identical calls may each compute on a shared miss; there is
//!   no single-flight suppression.
//! - Store and compute failures propagate unchanged; nothing is retried or
//!   served stale.

pub mod args;
pub mod engine;
pub mod error;
pub mod invalidate;
pub mod key;
pub mod memory;
pub mod store;
pub mod version;

// Re-export main types
pub use args::{ArgumentTuple, CallArgs, FuncSpec, Param};
pub use engine::{ComputeFuture, Memoize, Memoized, Memoizer};
pub use error::{MemoError, MemoResult};
pub use key::{derive_key, KEY_PREFIX};
pub use memory::MemoryStore;
pub use store::{CacheStore, Timeout};
pub use version::VersionRegistry;
