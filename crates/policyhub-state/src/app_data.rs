//! App-wide reference data: facet lists, total policy count, version cache.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use policyhub_client::CatalogApi;
use policyhub_model::{ListParams, Policy};
use tokio::sync::watch;

use crate::version_cache::VersionCache;

/// Reference data shared by every view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppDataState {
    pub categories: Vec<String>,
    pub providers: Vec<String>,
    pub platforms: Vec<String>,
    pub total_policies: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub initialized: bool,
}

type SharedLoad = Shared<BoxFuture<'static, Arc<AppDataState>>>;

enum LoadState {
    Unloaded,
    Loading(SharedLoad),
    Loaded,
}

struct StoreInner {
    api: Arc<dyn CatalogApi>,
    state: watch::Sender<Arc<AppDataState>>,
    load: Mutex<LoadState>,
    versions: VersionCache,
}

/// Lazily loaded app-wide data.
///
/// Nothing is fetched until [`ensure_loaded`](Self::ensure_loaded) is called.
/// Concurrent callers share one load. A failed load still marks the store as
/// initialized, with the error recorded, and is not retried until
/// [`refresh`](Self::refresh).
#[derive(Clone)]
pub struct AppDataStore {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for AppDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDataStore")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl AppDataStore {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self::with_version_cache(api, VersionCache::new())
    }

    pub fn with_version_cache(api: Arc<dyn CatalogApi>, versions: VersionCache) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                api,
                state: watch::Sender::new(Arc::new(AppDataState::default())),
                load: Mutex::new(LoadState::Unloaded),
                versions,
            }),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AppDataState> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Receiver observing every state replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppDataState>> {
        self.inner.state.subscribe()
    }

    /// Loads the data unless it is already loaded, joining a load in progress.
    pub async fn ensure_loaded(&self) -> Arc<AppDataState> {
        let pending = {
            let mut load = self.inner.load.lock();
            match &*load {
                LoadState::Loaded => return self.snapshot(),
                LoadState::Loading(pending) => {
                    tracing::debug!("joining app data load");
                    pending.clone()
                }
                LoadState::Unloaded => {
                    let pending = self.start_load();
                    *load = LoadState::Loading(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// Loads the data again. A load already in progress is joined instead.
    pub async fn refresh(&self) -> Arc<AppDataState> {
        {
            let mut load = self.inner.load.lock();
            if matches!(*load, LoadState::Loaded) {
                *load = LoadState::Unloaded;
            }
        }
        self.ensure_loaded().await
    }

    fn start_load(&self) -> SharedLoad {
        self.inner.state.send_modify(|state| {
            let mut next = AppDataState::clone(state);
            next.loading = true;
            next.error = None;
            *state = Arc::new(next);
        });

        let inner = Arc::clone(&self.inner);
        async move {
            let api = &inner.api;
            let count = ListParams::with_page_size(1);
            let result = futures::try_join!(
                api.categories(),
                api.providers(),
                api.platforms(),
                api.list_policies(&count),
            );

            let previous = AppDataState::clone(&inner.state.borrow());
            let next = match result {
                Ok((categories, providers, platforms, page)) => {
                    tracing::debug!(
                        categories = categories.len(),
                        providers = providers.len(),
                        platforms = platforms.len(),
                        total = page.total_items(),
                        "app data loaded"
                    );
                    AppDataState {
                        categories,
                        providers,
                        platforms,
                        total_policies: page.total_items(),
                        loading: false,
                        error: None,
                        initialized: true,
                    }
                }
                Err(err) => {
                    tracing::warn!(code = %err.code, "failed to load app data: {}", err.message);
                    AppDataState {
                        loading: false,
                        error: Some(err.message),
                        initialized: true,
                        ..previous
                    }
                }
            };

            let next = Arc::new(next);
            inner.state.send_replace(Arc::clone(&next));
            *inner.load.lock() = LoadState::Loaded;
            next
        }
        .boxed()
        .shared()
    }

    /// Cached versions of a policy, if still fresh.
    #[must_use]
    pub fn versions_cache(&self, name: &str) -> Option<Vec<Policy>> {
        self.inner.versions.get(name)
    }

    /// Stores the versions of a policy.
    pub fn set_versions_cache(&self, name: &str, versions: Vec<Policy>) {
        self.inner.versions.set(name, versions);
    }

    /// API the store loads from.
    #[must_use]
    pub fn api(&self) -> Arc<dyn CatalogApi> {
        Arc::clone(&self.inner.api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policyhub_client::MockCatalog;

    #[tokio::test]
    async fn test_nothing_loaded_before_first_use() {
        let store = AppDataStore::new(Arc::new(MockCatalog::new()));
        let state = store.snapshot();
        assert!(!state.initialized);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_versions_cache_round_trip() {
        let store = AppDataStore::new(Arc::new(MockCatalog::new()));
        store.set_versions_cache("cors", vec![Policy::new("cors", "1.0", "WSO2")]);
        assert_eq!(store.versions_cache("cors").map(|v| v.len()), Some(1));
    }
}
