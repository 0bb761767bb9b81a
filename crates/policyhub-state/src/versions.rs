//! Version lists of a policy, and headline stats.

use std::sync::Arc;

use policyhub_client::CatalogApi;
use policyhub_model::{Policy, Result, VersionListParams};

use crate::app_data::{AppDataState, AppDataStore};
use crate::fetch::{AsyncData, CacheKey, FetchState, RequestDeduplicator};

/// Dedup key for the version list of `name`.
#[must_use]
pub fn versions_key(name: &str) -> CacheKey {
    CacheKey::new(format!("versions-{name}"))
}

/// All versions of one policy, served from the version cache when fresh.
#[derive(Debug)]
pub struct PolicyVersions {
    name: String,
    store: AppDataStore,
    resource: AsyncData<Vec<Policy>>,
}

impl PolicyVersions {
    pub fn new(name: impl Into<String>, store: AppDataStore, dedup: RequestDeduplicator) -> Self {
        Self {
            name: name.into(),
            store,
            resource: AsyncData::new(dedup),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loads the versions: cache first, otherwise one page of up to 100 versions.
    pub async fn load(&self) -> Result<Vec<Policy>> {
        let name = self.name.clone();
        let store = self.store.clone();
        let api: Arc<dyn CatalogApi> = store.api();
        self.resource
            .load(versions_key(&self.name), move || {
                let name = name.clone();
                let store = store.clone();
                let api = Arc::clone(&api);
                async move {
                    if let Some(cached) = store.versions_cache(&name) {
                        return Ok(cached);
                    }
                    let page = api.list_versions(&name, VersionListParams::all()).await?;
                    store.set_versions_cache(&name, page.items.clone());
                    Ok(page.items)
                }
            })
            .await
    }

    #[must_use]
    pub fn state(&self) -> FetchState<Vec<Policy>> {
        self.resource.state()
    }

    /// Loaded versions, empty until a load succeeds.
    #[must_use]
    pub fn versions(&self) -> Vec<Policy> {
        self.resource.state().data.unwrap_or_default()
    }

    /// Version string of the latest version: the flagged one, else the first.
    #[must_use]
    pub fn latest_version(&self) -> Option<String> {
        policyhub_model::latest_version(&self.versions()).map(|p| p.version.clone())
    }

    pub fn unmount(&self) {
        self.resource.unmount();
    }
}

/// Headline counts for the about page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_policies: u64,
    pub total_categories: usize,
    pub total_platforms: usize,
    pub total_providers: usize,
}

impl From<&AppDataState> for Stats {
    fn from(state: &AppDataState) -> Self {
        Self {
            total_policies: state.total_policies,
            total_categories: state.categories.len(),
            total_platforms: state.platforms.len(),
            total_providers: state.providers.len(),
        }
    }
}

/// Stats derived from the app data store, or the store's error message.
pub async fn load_stats(store: &AppDataStore) -> std::result::Result<Stats, String> {
    let state = store.ensure_loaded().await;
    match &state.error {
        Some(message) => Err(message.clone()),
        None => Ok(Stats::from(state.as_ref())),
    }
}

/// Dedup key for the detail of one version.
#[must_use]
pub fn version_detail_key(name: &str, version: &str) -> CacheKey {
    CacheKey::new(format!("version-detail-{name}-{version}"))
}
