//! Shared containers handed to every view.

use std::fmt;
use std::sync::Arc;

use policyhub_client::CatalogApi;

use crate::app_data::AppDataStore;
use crate::fetch::{AsyncData, RequestDeduplicator};
use crate::notify::{ErrorHandler, NotificationCenter};
use crate::versions::PolicyVersions;

/// One application instance: API, in-flight map, app data, notifications.
///
/// Cheap to clone. Independent instances share nothing, so tests can run
/// several side by side.
#[derive(Clone)]
pub struct AppContext {
    api: Arc<dyn CatalogApi>,
    dedup: RequestDeduplicator,
    store: AppDataStore,
    notifications: NotificationCenter,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("dedup", &self.dedup)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            store: AppDataStore::new(Arc::clone(&api)),
            api,
            dedup: RequestDeduplicator::new(),
            notifications: NotificationCenter::new(),
        }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<dyn CatalogApi> {
        &self.api
    }

    #[must_use]
    pub fn dedup(&self) -> &RequestDeduplicator {
        &self.dedup
    }

    #[must_use]
    pub fn store(&self) -> &AppDataStore {
        &self.store
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    #[must_use]
    pub fn error_handler(&self) -> ErrorHandler {
        ErrorHandler::new(self.notifications.clone())
    }

    /// A fresh resource bound to this context's in-flight map.
    #[must_use]
    pub fn resource<T>(&self) -> AsyncData<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        AsyncData::new(self.dedup.clone())
    }

    /// Version list of `name`.
    #[must_use]
    pub fn policy_versions(&self, name: &str) -> PolicyVersions {
        PolicyVersions::new(name, self.store.clone(), self.dedup.clone())
    }
}
