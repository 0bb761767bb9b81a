//! Async data resources with request deduplication.
//!
//! [`RequestDeduplicator`] is the in-flight map: concurrent requests for the
//! same [`CacheKey`] share one underlying future, and the entry stays around
//! for a short grace period after it settles so that late duplicates reuse the
//! settled result instead of issuing a second call.
//!
//! [`AsyncData`] is a single resource on top of it. It publishes
//! `{data, loading, error}` through a `watch` channel and only commits the
//! result of its most recent load.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use policyhub_model::{ApiError, Result};
use serde::Serialize;
use tokio::sync::watch;

/// How long a settled request stays joinable.
pub const DEDUP_GRACE: Duration = Duration::from_millis(100);

/// A request future that any number of callers can await.
pub type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Key identifying a request in the in-flight map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derives a key from a dependency list by JSON-encoding it.
    pub fn from_deps<D: Serialize + ?Sized>(deps: &D) -> Result<Self> {
        Ok(Self(serde_json::to_string(deps)?))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

struct InFlight {
    id: u64,
    future: Arc<dyn Any + Send + Sync>,
}

struct DedupInner {
    grace: Duration,
    next_id: AtomicU64,
    entries: Mutex<HashMap<String, InFlight>>,
}

impl DedupInner {
    fn release(&self, key: &str, id: u64) {
        let mut entries = self.entries.lock();
        if entries.get(key).is_some_and(|entry| entry.id == id) {
            entries.remove(key);
            tracing::trace!(key, "released request");
        }
    }
}

/// Shared map of in-flight requests.
///
/// Clones share the same map. Separate instances never see each other's
/// requests.
#[derive(Clone)]
pub struct RequestDeduplicator {
    inner: Arc<DedupInner>,
}

impl Default for RequestDeduplicator {
    fn default() -> Self {
        Self::with_grace(DEDUP_GRACE)
    }
}

impl fmt::Debug for RequestDeduplicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDeduplicator")
            .field("grace", &self.inner.grace)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl RequestDeduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deduplicator whose entries stay joinable for `grace` after settling.
    #[must_use]
    pub fn with_grace(grace: Duration) -> Self {
        Self {
            inner: Arc::new(DedupInner {
                grace,
                next_id: AtomicU64::new(0),
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the in-flight future for `key`, or starts `fetch` and registers it.
    ///
    /// `fetch` is only called when no entry exists. It must not call back into
    /// this deduplicator synchronously.
    pub fn run<T, F, Fut>(&self, key: &CacheKey, fetch: F) -> SharedFetch<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut entries = self.inner.entries.lock();
        if let Some(entry) = entries.get(key.as_str()) {
            if let Some(shared) = entry.future.downcast_ref::<SharedFetch<T>>() {
                tracing::debug!(key = %key, "joining in-flight request");
                return shared.clone();
            }
            tracing::warn!(
                key = %key,
                expected = std::any::type_name::<T>(),
                "in-flight request under this key has another result type, starting a new one"
            );
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let request = fetch();
        let owner = Arc::downgrade(&self.inner);
        let owned_key = key.as_str().to_string();
        let shared = async move {
            let result = request.await;
            schedule_release(owner, owned_key, id);
            result
        }
        .boxed()
        .shared();

        entries.insert(
            key.as_str().to_string(),
            InFlight {
                id,
                future: Arc::new(shared.clone()),
            },
        );
        tracing::debug!(key = %key, "started request");
        shared
    }

    /// Number of registered entries, settled ones inside their grace period included.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.entries.lock().len()
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.entries.lock().contains_key(key.as_str())
    }
}

fn schedule_release(owner: Weak<DedupInner>, key: String, id: u64) {
    let Some(inner) = owner.upgrade() else {
        return;
    };
    if inner.grace.is_zero() {
        inner.release(&key, id);
        return;
    }
    let grace = inner.grace;
    drop(inner);
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        if let Some(inner) = owner.upgrade() {
            inner.release(&key, id);
        }
    });
}

/// Snapshot of an async resource.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> FetchState<T> {
    #[must_use]
    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: ApiError) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error),
        }
    }
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// One async resource: `{data, loading, error}` plus the fetch that fills it.
///
/// Every load takes a sequence number and only the most recent one commits
/// its result, so a slow earlier response can never overwrite a newer one.
/// After [`unmount`](Self::unmount) completions no longer touch the state,
/// although the underlying request still runs to completion.
pub struct AsyncData<T> {
    dedup: RequestDeduplicator,
    state: watch::Sender<FetchState<T>>,
    mounted: Arc<AtomicBool>,
    seq: AtomicU64,
    last: Mutex<Option<(CacheKey, Fetcher<T>)>>,
}

impl<T> fmt::Debug for AsyncData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncData")
            .field("mounted", &self.is_mounted())
            .field("seq", &self.seq.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T> AsyncData<T> {
    /// Detaches the resource; later completions are not written.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}

impl<T> AsyncData<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Resource using `dedup` as its in-flight map.
    #[must_use]
    pub fn new(dedup: RequestDeduplicator) -> Self {
        Self {
            dedup,
            state: watch::Sender::new(FetchState::default()),
            mounted: Arc::new(AtomicBool::new(true)),
            seq: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    /// Runs `fetch` under `key` and remembers it for [`refetch`](Self::refetch).
    ///
    /// The error, if any, is stored in the state and also returned.
    pub async fn load<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetch().boxed());
        *self.last.lock() = Some((key.clone(), Arc::clone(&fetcher)));
        self.execute(key, fetcher).await
    }

    /// Runs the last fetch again.
    pub async fn refetch(&self) -> Result<T> {
        let last = self.last.lock().clone();
        let Some((key, fetcher)) = last else {
            return Err(ApiError::new(
                500,
                "UNKNOWN_ERROR",
                "nothing has been loaded yet",
            ));
        };
        self.execute(key, fetcher).await
    }

    async fn execute(&self, key: CacheKey, fetcher: Fetcher<T>) -> Result<T> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        if self.is_mounted() {
            self.state.send_modify(|state| {
                state.loading = true;
                state.error = None;
            });
        }

        let result = self.dedup.run(&key, || fetcher()).await;

        if !self.is_mounted() {
            tracing::trace!(key = %key, "resource unmounted, dropping result");
        } else if self.seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(key = %key, seq, "newer load pending, dropping stale result");
        } else {
            self.state.send_replace(match &result {
                Ok(data) => FetchState::ready(data.clone()),
                Err(err) => FetchState::failed(err.clone()),
            });
        }
        result
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every committed state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_deps_is_json() {
        let key = CacheKey::from_deps(&("cors", 2)).expect("key");
        assert_eq!(key.as_str(), r#"["cors",2]"#);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_released_after_grace() {
        let dedup = RequestDeduplicator::new();
        let key = CacheKey::new("k");
        let value = dedup.run(&key, || async { Ok(1_u32) }).await;
        assert_eq!(value, Ok(1));
        assert!(dedup.contains(&key));

        tokio::time::sleep(DEDUP_GRACE + Duration::from_millis(1)).await;
        assert!(!dedup.contains(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_result_reused_inside_grace() {
        let dedup = RequestDeduplicator::new();
        let key = CacheKey::new("k");
        dedup.run(&key, || async { Ok(1_u32) }).await.expect("first");

        let second = dedup.run(&key, || async { Ok(2_u32) }).await;
        assert_eq!(second, Ok(1));
    }

    #[tokio::test]
    async fn test_refetch_without_load_fails() {
        let data: AsyncData<u32> = AsyncData::new(RequestDeduplicator::new());
        let err = data.refetch().await.unwrap_err();
        assert_eq!(err.code, "UNKNOWN_ERROR");
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_reused_with_other_type_starts_new_request() {
        let dedup = RequestDeduplicator::new();
        let key = CacheKey::new("k");
        dedup.run(&key, || async { Ok(1_u32) }).await.expect("first");

        let other = dedup
            .run(&key, || async { Ok("two".to_string()) })
            .await;
        assert_eq!(other, Ok("two".to_string()));
        assert_eq!(dedup.in_flight(), 1);
    }

    #[test]
    fn test_debug_reports_mount_state() {
        struct Opaque;
        let data: AsyncData<Opaque> = AsyncData {
            dedup: RequestDeduplicator::new(),
            state: watch::Sender::new(FetchState::default()),
            mounted: Arc::new(AtomicBool::new(true)),
            seq: AtomicU64::new(0),
            last: Mutex::new(None),
        };
        assert!(format!("{data:?}").contains("mounted: true"));
        data.unmount();
        assert!(!data.is_mounted());
        assert!(format!("{data:?}").contains("mounted: false"));
    }
}
