//! In-memory catalog for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use policyhub_model::{
    ApiError, DEFAULT_PAGE_SIZE, DocsAllResponse, DocsFormat, DocsPage, DocsSingleResponse,
    HealthStatus, ListParams, Page, PaginationMeta, Policy, Result, VersionListParams,
    latest_version,
};

use crate::api::CatalogApi;

/// Catalog operations, used to count calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Health,
    ListPolicies,
    Categories,
    Providers,
    Platforms,
    PolicySummary,
    ListVersions,
    LatestVersion,
    VersionDetail,
    Definition,
    AllDocs,
    DocPage,
}

#[derive(Debug, Default)]
struct MockState {
    calls: HashMap<Endpoint, usize>,
    failures: HashMap<Endpoint, ApiError>,
    list_requests: Vec<ListParams>,
}

/// In-memory [`CatalogApi`].
///
/// Holds a fixed set of policy versions and answers every operation from it.
/// Calls are counted per [`Endpoint`], failures can be injected per endpoint,
/// and an optional delay (a `tokio` sleep, so paused test clocks apply) keeps
/// requests in flight long enough to observe sharing.
///
/// # Examples
///
/// ```
/// use policyhub_client::{CatalogApi, Endpoint, MockCatalog};
/// use policyhub_model::Policy;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut latest = Policy::new("cors", "2.0", "WSO2");
/// latest.is_latest = true;
/// let catalog = MockCatalog::new().with_policies([latest]);
///
/// let summary = catalog.policy_summary("cors").await.unwrap();
/// assert_eq!(summary.version, "2.0");
/// assert_eq!(catalog.calls(Endpoint::PolicySummary), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockCatalog {
    policies: Vec<Policy>,
    categories: Vec<String>,
    providers: Vec<String>,
    platforms: Vec<String>,
    docs: HashMap<(String, String), DocsAllResponse>,
    definitions: HashMap<(String, String), String>,
    delay: Option<Duration>,
    state: Mutex<MockState>,
}

impl MockCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds policy versions. Categories, providers and platforms are derived from them.
    #[must_use]
    pub fn with_policies(mut self, policies: impl IntoIterator<Item = Policy>) -> Self {
        self.policies.extend(policies);
        self.categories = distinct(self.policies.iter().flat_map(|p| p.categories.iter()));
        self.providers = distinct(self.policies.iter().map(|p| &p.provider));
        self.platforms = distinct(
            self.policies
                .iter()
                .flat_map(|p| p.supported_platforms.iter()),
        );
        self
    }

    /// Stores documentation pages for one version.
    #[must_use]
    pub fn with_docs(mut self, name: &str, version: &str, docs: DocsAllResponse) -> Self {
        self.docs
            .insert((name.to_string(), version.to_string()), docs);
        self
    }

    /// Stores the raw definition of one version.
    #[must_use]
    pub fn with_definition(mut self, name: &str, version: &str, yaml: impl Into<String>) -> Self {
        self.definitions
            .insert((name.to_string(), version.to_string()), yaml.into());
        self
    }

    /// Delays every response.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every later call to `endpoint` fail with `err`.
    pub fn fail(&self, endpoint: Endpoint, err: ApiError) {
        self.state.lock().failures.insert(endpoint, err);
    }

    /// Removes an injected failure.
    pub fn recover(&self, endpoint: Endpoint) {
        self.state.lock().failures.remove(&endpoint);
    }

    /// Number of calls made to `endpoint`.
    #[must_use]
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.state.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    /// Parameters of every `list_policies` call, oldest first.
    #[must_use]
    pub fn list_requests(&self) -> Vec<ListParams> {
        self.state.lock().list_requests.clone()
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<()> {
        let failure = {
            let mut state = self.state.lock();
            *state.calls.entry(endpoint).or_default() += 1;
            state.failures.get(&endpoint).cloned()
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }

    fn versions_of(&self, name: &str) -> Vec<Policy> {
        self.policies
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect()
    }

    fn find_version(&self, name: &str, version: &str) -> Result<Policy> {
        self.policies
            .iter()
            .find(|p| p.name == name && p.version == version)
            .cloned()
            .ok_or_else(|| {
                ApiError::new(
                    404,
                    "POLICY_VERSION_NOT_FOUND",
                    format!("policy version '{name}@{version}' not found"),
                )
            })
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = values.cloned().collect();
    out.sort();
    out.dedup();
    out
}

fn policy_not_found(name: &str) -> ApiError {
    ApiError::new(404, "POLICY_NOT_FOUND", format!("policy '{name}' not found"))
}

fn matches_any(selected: &[String], values: &[String]) -> bool {
    selected.is_empty() || selected.iter().any(|s| values.contains(s))
}

fn paginate(items: Vec<Policy>, page: Option<u32>, page_size: Option<u32>) -> Page<Policy> {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let total_items = items.len() as u64;
    let total_pages = total_items.div_ceil(u64::from(page_size)) as u32;
    let start =
        usize::try_from(u64::from(page - 1) * u64::from(page_size)).unwrap_or(usize::MAX);
    Page {
        items: items
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect(),
        pagination: PaginationMeta {
            page,
            page_size,
            total_items,
            total_pages,
        },
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn health(&self) -> Result<HealthStatus> {
        self.enter(Endpoint::Health).await?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        })
    }

    async fn list_policies(&self, params: &ListParams) -> Result<Page<Policy>> {
        self.state.lock().list_requests.push(params.clone());
        self.enter(Endpoint::ListPolicies).await?;

        let search = params.search.as_deref().unwrap_or_default().to_lowercase();
        let matching = self
            .policies
            .iter()
            .filter(|p| p.is_latest)
            .filter(|p| {
                search.is_empty()
                    || p.name.to_lowercase().contains(&search)
                    || p.display_name.to_lowercase().contains(&search)
                    || p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&search))
            })
            .filter(|p| matches_any(&params.categories, &p.categories))
            .filter(|p| matches_any(&params.providers, std::slice::from_ref(&p.provider)))
            .filter(|p| matches_any(&params.platforms, &p.supported_platforms))
            .cloned()
            .collect();
        Ok(paginate(matching, params.page, params.page_size))
    }

    async fn categories(&self) -> Result<Vec<String>> {
        self.enter(Endpoint::Categories).await?;
        Ok(self.categories.clone())
    }

    async fn providers(&self) -> Result<Vec<String>> {
        self.enter(Endpoint::Providers).await?;
        Ok(self.providers.clone())
    }

    async fn platforms(&self) -> Result<Vec<String>> {
        self.enter(Endpoint::Platforms).await?;
        Ok(self.platforms.clone())
    }

    async fn policy_summary(&self, name: &str) -> Result<Policy> {
        self.enter(Endpoint::PolicySummary).await?;
        latest_version(&self.versions_of(name))
            .cloned()
            .ok_or_else(|| policy_not_found(name))
    }

    async fn list_versions(&self, name: &str, params: VersionListParams) -> Result<Page<Policy>> {
        self.enter(Endpoint::ListVersions).await?;
        let versions = self.versions_of(name);
        if versions.is_empty() {
            return Err(policy_not_found(name));
        }
        Ok(paginate(versions, params.page, params.page_size))
    }

    async fn latest_version(&self, name: &str) -> Result<Policy> {
        self.enter(Endpoint::LatestVersion).await?;
        latest_version(&self.versions_of(name))
            .cloned()
            .ok_or_else(|| policy_not_found(name))
    }

    async fn version_detail(&self, name: &str, version: &str) -> Result<Policy> {
        self.enter(Endpoint::VersionDetail).await?;
        self.find_version(name, version)
    }

    async fn definition(&self, name: &str, version: &str) -> Result<String> {
        self.enter(Endpoint::Definition).await?;
        let policy = self.find_version(name, version)?;
        Ok(self
            .definitions
            .get(&(name.to_string(), version.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                format!("name: {}\nversion: {}\n", policy.name, policy.version)
            }))
    }

    async fn all_docs(&self, name: &str, version: &str) -> Result<DocsAllResponse> {
        self.enter(Endpoint::AllDocs).await?;
        self.find_version(name, version)?;
        Ok(self
            .docs
            .get(&(name.to_string(), version.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn doc_page(
        &self,
        name: &str,
        version: &str,
        page: DocsPage,
    ) -> Result<DocsSingleResponse> {
        self.enter(Endpoint::DocPage).await?;
        self.find_version(name, version)?;
        self.docs
            .get(&(name.to_string(), version.to_string()))
            .and_then(|docs| docs.iter().find(|d| d.page == page))
            .cloned()
            .ok_or_else(|| {
                ApiError::new(
                    404,
                    "DOC_NOT_FOUND",
                    format!("no {page} page for '{name}@{version}'"),
                )
            })
    }
}

/// A markdown page, for fixtures.
#[must_use]
pub fn doc(page: DocsPage, content: &str) -> DocsSingleResponse {
    DocsSingleResponse {
        page,
        format: DocsFormat::Markdown,
        content: content.to_string(),
    }
}
