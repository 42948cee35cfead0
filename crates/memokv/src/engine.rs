//! Get-or-compute-and-store orchestration.
//!
//! [`Memoizer`] is constructed explicitly around an injected store — there is
//! no implicit process-global instance. [`Memoizer::memoize`] returns the
//! wrapping combinator: applied to a [`FuncSpec`] and a compute closure it
//! yields a [`Memoized`] handle whose `call` is transparent on a hit and
//! invokes the closure exactly once per genuine miss.
//!
//! The get-then-compute-then-set sequence is not transactional: concurrent
//! callers with identical arguments may each observe a miss, each compute,
//! and each overwrite the same key with equal results. That duplication is
//! accepted; no locking or single-flight suppression happens here.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::args::{CallArgs, FuncSpec};
use crate::error::MemoResult;
use crate::key::derive_key;
use crate::memory::MemoryStore;
use crate::store::{CacheStore, Timeout};
use crate::version::VersionRegistry;

/// Future returned by a wrapped compute closure.
pub type ComputeFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;

type ComputeFn = dyn Fn(CallArgs) -> ComputeFuture + Send + Sync;

/// Memoization engine over an injected [`CacheStore`].
#[derive(Clone)]
pub struct Memoizer {
    store: Arc<dyn CacheStore>,
    versions: VersionRegistry,
}

impl Memoizer {
    /// Create an engine over the given store.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            versions: VersionRegistry::new(store.clone()),
            store,
        }
    }

    /// Convenience engine over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The wrapping combinator: `memoizer.memoize(timeout).wrap(spec, f)`
    /// yields the memoized form of `f` with the given expiry policy.
    pub fn memoize(&self, timeout: Timeout) -> Memoize {
        Memoize {
            memoizer: self.clone(),
            timeout,
        }
    }

    pub(crate) fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub(crate) fn versions(&self) -> &VersionRegistry {
        &self.versions
    }
}

/// Partially applied combinator produced by [`Memoizer::memoize`].
pub struct Memoize {
    memoizer: Memoizer,
    timeout: Timeout,
}

impl Memoize {
    /// Wrap an async compute closure.
    ///
    /// The closure receives the original raw [`CallArgs`] on every genuine
    /// miss; its errors propagate unchanged and are never cached.
    pub fn wrap<F>(self, spec: FuncSpec, compute: F) -> Memoized
    where
        F: Fn(CallArgs) -> ComputeFuture + Send + Sync + 'static,
    {
        Memoized {
            memoizer: self.memoizer,
            spec,
            timeout: self.timeout,
            compute: Arc::new(compute),
        }
    }

    /// Wrap a synchronous compute closure.
    pub fn wrap_fn<F>(self, spec: FuncSpec, compute: F) -> Memoized
    where
        F: Fn(CallArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.wrap(spec, move |args| {
            let result = compute(args);
            Box::pin(async move { result })
        })
    }
}

/// A memoized function: the wrapped compute closure plus its registration
/// (identity, signature, expiry policy) and the engine it runs against.
#[derive(Clone)]
pub struct Memoized {
    memoizer: Memoizer,
    spec: FuncSpec,
    timeout: Timeout,
    compute: Arc<ComputeFn>,
}

impl Memoized {
    /// Call the memoized function.
    ///
    /// Serves from cache when a value is stored under the derived key;
    /// otherwise invokes the wrapped closure and stores the result — unless
    /// the result is the absence value `Value::Null`, which is deliberately
    /// never stored, so every call producing it recomputes.
    pub async fn call(&self, args: CallArgs) -> MemoResult<Value> {
        let identity = self.spec.identity();
        let normalized = self.spec.bind(&args)?;
        let version = self.memoizer.versions().get_or_create(identity).await?;
        let key = derive_key(identity, &normalized, &version);

        if let Some(stored) = self.memoizer.store().get(&key).await? {
            debug!(identity, %key, "cache hit");
            return Ok(stored);
        }
        debug!(identity, %key, "cache miss");

        let result = (self.compute)(args).await?;
        if result == Value::Null {
            debug!(identity, %key, "null result not stored");
            return Ok(result);
        }

        self.memoizer
            .store()
            .set(&key, result.clone(), self.timeout)
            .await?;
        Ok(result)
    }

    /// The registration this handle was wrapped with.
    pub fn spec(&self) -> &FuncSpec {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_add(memoizer: &Memoizer, calls: Arc<AtomicUsize>) -> Memoized {
        memoizer.memoize(Timeout::Seconds(60)).wrap_fn(
            FuncSpec::new("tests.add").param("a").param_with_default("b", 10),
            move |args| {
                calls.fetch_add(1, Ordering::SeqCst);
                let tuple = FuncSpec::new("tests.add")
                    .param("a")
                    .param_with_default("b", 10)
                    .bind(&args)?;
                let sum: i64 = tuple
                    .positional
                    .iter()
                    .map(|v| v.as_i64().unwrap_or(0))
                    .sum();
                Ok(json!(sum))
            },
        )
    }

    #[tokio::test]
    async fn second_call_serves_from_cache() {
        let memoizer = Memoizer::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let add = counted_add(&memoizer, calls.clone());

        let args = CallArgs::none().arg(1).arg(2);
        assert_eq!(add.call(args.clone()).await.unwrap(), json!(3));
        assert_eq!(add.call(args).await.unwrap(), json!(3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn compute_receives_raw_args_not_normalized_ones() {
        let memoizer = Memoizer::in_memory();
        let seen = Arc::new(std::sync::Mutex::new(None));
        let seen_in = seen.clone();
        let f = memoizer.memoize(Timeout::Default).wrap_fn(
            FuncSpec::new("tests.echo").param("a").param_with_default("b", 10),
            move |args| {
                *seen_in.lock().unwrap() = Some(args);
                Ok(json!("ok"))
            },
        );

        let raw = CallArgs::none().kwarg("a", 1);
        f.call(raw.clone()).await.unwrap();
        assert_eq!(seen.lock().unwrap().clone(), Some(raw));
    }

    #[tokio::test]
    async fn compute_errors_propagate_and_are_not_cached() {
        let memoizer = Memoizer::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let flaky = memoizer.memoize(Timeout::Default).wrap_fn(
            FuncSpec::new("tests.flaky").param("x"),
            move |_| {
                let n = calls_in.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(anyhow!("transient failure"))
                } else {
                    Ok(json!("recovered"))
                }
            },
        );

        let args = CallArgs::none().arg(1);
        let err = flaky.call(args.clone()).await.unwrap_err();
        assert!(err.to_string().contains("transient failure"));

        // The failure was not cached; the next call recomputes and succeeds.
        assert_eq!(flaky.call(args.clone()).await.unwrap(), json!("recovered"));
        assert_eq!(flaky.call(args).await.unwrap(), json!("recovered"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn null_results_recompute_every_call() {
        let memoizer = Memoizer::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let absent = memoizer
            .memoize(Timeout::Default)
            .wrap_fn(FuncSpec::new("tests.absent").param("x"), move |_| {
                calls_in.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            });

        let args = CallArgs::none().arg(1);
        assert_eq!(absent.call(args.clone()).await.unwrap(), Value::Null);
        assert_eq!(absent.call(args).await.unwrap(), Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn binding_error_precedes_compute() {
        let memoizer = Memoizer::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let add = counted_add(&memoizer, calls.clone());

        let err = add.call(CallArgs::none().kwarg("c", 3)).await.unwrap_err();
        assert!(err.is_binding());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn async_closure_form_caches_too() {
        let memoizer = Memoizer::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let f = memoizer.memoize(Timeout::Default).wrap(
            FuncSpec::new("tests.slow").param("x"),
            move |_args| {
                let calls = calls_in.clone();
                let fut: ComputeFuture = Box::pin(async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    Ok(json!("done"))
                });
                fut
            },
        );

        let args = CallArgs::none().arg(5);
        assert_eq!(f.call(args.clone()).await.unwrap(), json!("done"));
        assert_eq!(f.call(args).await.unwrap(), json!("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicate_misses_are_benign() {
        let memoizer = Memoizer::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let add = counted_add(&memoizer, calls.clone());

        let args = CallArgs::none().arg(2).arg(3);
        let (a, b) = tokio::join!(add.call(args.clone()), add.call(args.clone()));
        assert_eq!(a.unwrap(), json!(5));
        assert_eq!(b.unwrap(), json!(5));
        // Both callers may have computed; neither result is wrong.
        let computed = calls.load(Ordering::SeqCst);
        assert!((1..=2).contains(&computed));

        add.call(args).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), computed);
    }
}
