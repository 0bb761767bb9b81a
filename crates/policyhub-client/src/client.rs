//! HTTP implementation of [`CatalogApi`].

use async_trait::async_trait;
use futures::future::join_all;
use policyhub_model::{
    ApiError, BaseResponse, DocsAllResponse, DocsPage, DocsSingleResponse, HealthStatus,
    ListParams, Page, PaginatedResponse, Policy, Result, VersionListParams, encode_component,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::api::CatalogApi;
use crate::config::{ClientConfig, ConfigError};
use crate::error::{from_status, from_transport};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("policyhub/", env!("CARGO_PKG_VERSION"));

const JSON: &str = "application/json";
const YAML: &str = "text/yaml";

/// Policy Hub API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PolicyHubClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl PolicyHubClient {
    /// Creates a client for the configured base URL and timeout.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Build(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of a policy-specific asset. No request is made.
    #[must_use]
    pub fn asset_url(&self, policy: &str, version: &str, file: &str) -> String {
        format!(
            "{}/assets/{}/{}/{}",
            self.config.base_url,
            encode_component(policy),
            encode_component(version),
            encode_component(file)
        )
    }

    /// URL of a global asset. No request is made.
    #[must_use]
    pub fn global_asset_url(&self, filename: &str) -> String {
        format!(
            "{}/assets/global/{}",
            self.config.base_url,
            encode_component(filename)
        )
    }

    /// Fetches several policy summaries concurrently, ignoring failures.
    ///
    /// Returns how many fetches succeeded.
    pub async fn prefetch_policies<S: AsRef<str>>(&self, names: &[S]) -> usize {
        let results = join_all(names.iter().map(|name| self.policy_summary(name.as_ref()))).await;
        let loaded = results.iter().filter(|r| r.is_ok()).count();
        tracing::debug!(requested = names.len(), loaded, "prefetched policy summaries");
        loaded
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Sends a GET and returns the body of a 2xx response.
    async fn fetch(&self, path: &str, accept: &'static str) -> Result<Vec<u8>> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = from_status(status, &body);
            tracing::debug!(%url, status = status.as_u16(), code = %err.code, "request failed");
            return Err(err);
        }

        let body = response.bytes().await.map_err(|e| from_transport(&e))?;
        Ok(body.to_vec())
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.fetch(path, JSON).await?;
        let envelope: BaseResponse<T> = serde_json::from_slice(&body)?;
        envelope.into_data()
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str) -> Result<Page<T>> {
        let body = self.fetch(path, JSON).await?;
        let envelope: PaginatedResponse<T> = serde_json::from_slice(&body)?;
        envelope.into_page()
    }
}

fn version_path(name: &str, version: &str) -> String {
    format!(
        "/policies/{}/versions/{}",
        encode_component(name),
        encode_component(version)
    )
}

#[async_trait]
impl CatalogApi for PolicyHubClient {
    async fn health(&self) -> Result<HealthStatus> {
        self.get_data("/health").await
    }

    async fn list_policies(&self, params: &ListParams) -> Result<Page<Policy>> {
        self.get_page(&format!("/policies{}", params.to_query()))
            .await
    }

    async fn categories(&self) -> Result<Vec<String>> {
        self.get_data("/policies/categories").await
    }

    async fn providers(&self) -> Result<Vec<String>> {
        self.get_data("/policies/providers").await
    }

    async fn platforms(&self) -> Result<Vec<String>> {
        self.get_data("/policies/platforms").await
    }

    async fn policy_summary(&self, name: &str) -> Result<Policy> {
        self.get_data(&format!("/policies/{}", encode_component(name)))
            .await
    }

    async fn list_versions(&self, name: &str, params: VersionListParams) -> Result<Page<Policy>> {
        self.get_page(&format!(
            "/policies/{}/versions{}",
            encode_component(name),
            params.to_query()
        ))
        .await
    }

    async fn latest_version(&self, name: &str) -> Result<Policy> {
        self.get_data(&format!(
            "/policies/{}/versions/latest",
            encode_component(name)
        ))
        .await
    }

    async fn version_detail(&self, name: &str, version: &str) -> Result<Policy> {
        self.get_data(&version_path(name, version)).await
    }

    async fn definition(&self, name: &str, version: &str) -> Result<String> {
        let body = self
            .fetch(&format!("{}/definition", version_path(name, version)), YAML)
            .await?;
        String::from_utf8(body).map_err(|e| {
            ApiError::new(500, "UNKNOWN_ERROR", format!("definition is not UTF-8: {e}"))
        })
    }

    async fn all_docs(&self, name: &str, version: &str) -> Result<DocsAllResponse> {
        self.get_data(&format!("{}/docs", version_path(name, version)))
            .await
    }

    async fn doc_page(
        &self,
        name: &str,
        version: &str,
        page: DocsPage,
    ) -> Result<DocsSingleResponse> {
        self.get_data(&format!("{}/docs/{}", version_path(name, version), page))
            .await
    }
}
