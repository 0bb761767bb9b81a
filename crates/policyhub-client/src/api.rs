//! The catalog operations the state layer depends on.

use async_trait::async_trait;
use policyhub_model::{
    DocsAllResponse, DocsPage, DocsSingleResponse, HealthStatus, ListParams, Page, Policy, Result,
    VersionListParams,
};

/// Read-only access to the Policy Hub catalog.
///
/// Implemented by [`PolicyHubClient`](crate::PolicyHubClient) over HTTP and by
/// [`MockCatalog`](crate::MockCatalog) in memory. Every method resolves to a
/// normalized [`ApiError`](policyhub_model::ApiError) on failure.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /health`.
    async fn health(&self) -> Result<HealthStatus>;

    /// `GET /policies` with search, facet filters and pagination.
    async fn list_policies(&self, params: &ListParams) -> Result<Page<Policy>>;

    /// Distinct category names.
    async fn categories(&self) -> Result<Vec<String>>;

    /// Distinct provider names.
    async fn providers(&self) -> Result<Vec<String>>;

    /// Distinct platform names.
    async fn platforms(&self) -> Result<Vec<String>>;

    /// Latest summary of a policy.
    async fn policy_summary(&self, name: &str) -> Result<Policy>;

    /// Versions of a policy.
    async fn list_versions(&self, name: &str, params: VersionListParams) -> Result<Page<Policy>>;

    /// The version flagged latest.
    async fn latest_version(&self, name: &str) -> Result<Policy>;

    /// Metadata of one version.
    async fn version_detail(&self, name: &str, version: &str) -> Result<Policy>;

    /// Raw YAML definition of one version.
    async fn definition(&self, name: &str, version: &str) -> Result<String>;

    /// Every documentation page of one version.
    async fn all_docs(&self, name: &str, version: &str) -> Result<DocsAllResponse>;

    /// One documentation page of one version.
    async fn doc_page(&self, name: &str, version: &str, page: DocsPage)
    -> Result<DocsSingleResponse>;
}
