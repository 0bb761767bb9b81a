//! Filter state for the policy list and its query-string codec.
//!
//! The location query string is the canonical store for [`FilterState`];
//! everything else decodes it on read and encodes a new one on write.

use serde::{Deserialize, Serialize};

use crate::query::{QueryParams, QueryString};

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the API accepts; used when listing all versions of a policy.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Which list facet a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Category,
    Provider,
    Platform,
}

impl Facet {
    /// Query-string key for the facet.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::Provider => "providers",
            Self::Platform => "platforms",
        }
    }
}

/// Search, facet filters, and pagination for the policy list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub search: String,
    pub categories: Vec<String>,
    pub providers: Vec<String>,
    pub platforms: Vec<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            categories: Vec::new(),
            providers: Vec::new(),
            platforms: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterState {
    /// Decodes a location query string.
    ///
    /// Lists split on `,` with empty fragments dropped. `page` and `pageSize`
    /// fall back to `1` and [`DEFAULT_PAGE_SIZE`] when absent, malformed, or
    /// below one.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let params = QueryParams::parse(query);
        Self {
            search: params.get("search").unwrap_or_default().to_string(),
            categories: params.list(Facet::Category.key()),
            providers: params.list(Facet::Provider.key()),
            platforms: params.list(Facet::Platform.key()),
            page: params.positive("page", 1),
            page_size: params.positive("pageSize", DEFAULT_PAGE_SIZE),
        }
    }

    /// Encodes the state as a minimal query string without a leading `?`.
    ///
    /// Defaults (`page=1`, the default page size, blank search, empty lists)
    /// are omitted, so the default state encodes to an empty string.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = QueryString::new();
        query
            .text("search", Some(self.search.trim()))
            .list(Facet::Category.key(), &trimmed(&self.categories))
            .list(Facet::Provider.key(), &trimmed(&self.providers))
            .list(Facet::Platform.key(), &trimmed(&self.platforms))
            .number("page", (self.page > 1).then_some(self.page))
            .number(
                "pageSize",
                (self.page_size > 0 && self.page_size != DEFAULT_PAGE_SIZE)
                    .then_some(self.page_size),
            );
        query.encode()
    }

    /// Applies a partial update. Without an explicit page the page resets to 1.
    #[must_use]
    pub fn apply(&self, update: FilterUpdate) -> Self {
        let mut next = self.clone();
        if let Some(search) = update.search {
            next.search = search;
        }
        if let Some(categories) = update.categories {
            next.categories = categories;
        }
        if let Some(providers) = update.providers {
            next.providers = providers;
        }
        if let Some(platforms) = update.platforms {
            next.platforms = platforms;
        }
        if let Some(page_size) = update.page_size.filter(|size| *size > 0) {
            next.page_size = page_size;
        }
        next.page = update.page.unwrap_or(1).max(1);
        next
    }

    /// Values selected for a facet.
    #[must_use]
    pub fn facet(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Category => &self.categories,
            Facet::Provider => &self.providers,
            Facet::Platform => &self.platforms,
        }
    }

    /// Update that adds `value` to a facet, or removes it when already selected.
    #[must_use]
    pub fn toggle(&self, facet: Facet, value: &str) -> FilterUpdate {
        let mut values = self.facet(facet).to_vec();
        if let Some(index) = values.iter().position(|v| v == value) {
            values.remove(index);
        } else {
            values.push(value.to_string());
        }
        match facet {
            Facet::Category => FilterUpdate::default().categories(values),
            Facet::Provider => FilterUpdate::default().providers(values),
            Facet::Platform => FilterUpdate::default().platforms(values),
        }
    }

    /// Number of active filters: one for a non-blank search plus each selected value.
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(!self.search.trim().is_empty())
            + self.categories.len()
            + self.providers.len()
            + self.platforms.len()
    }

    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        self.active_count() > 0
    }

    /// Parameters for the list endpoint. Page and page size are always explicit.
    #[must_use]
    pub fn to_list_params(&self) -> ListParams {
        let search = self.search.trim();
        ListParams {
            search: (!search.is_empty()).then(|| search.to_string()),
            categories: trimmed(&self.categories),
            providers: trimmed(&self.providers),
            platforms: trimmed(&self.platforms),
            page: Some(self.page.max(1)),
            page_size: Some(if self.page_size > 0 {
                self.page_size
            } else {
                DEFAULT_PAGE_SIZE
            }),
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partial change to a [`FilterState`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub categories: Option<Vec<String>>,
    pub providers: Option<Vec<String>>,
    pub platforms: Option<Vec<String>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl FilterUpdate {
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.categories = Some(categories);
        self
    }

    #[must_use]
    pub fn providers(mut self, providers: Vec<String>) -> Self {
        self.providers = Some(providers);
        self
    }

    #[must_use]
    pub fn platforms(mut self, platforms: Vec<String>) -> Self {
        self.platforms = Some(platforms);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Parameters of `GET /policies`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub providers: Vec<String>,
    pub platforms: Vec<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListParams {
    /// Only a page size; used to read the total policy count cheaply.
    #[must_use]
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Query suffix in the fixed key order, with a leading `?` when non-empty.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = QueryString::new();
        query
            .text("search", self.search.as_deref())
            .list(Facet::Category.key(), &self.categories)
            .list(Facet::Provider.key(), &self.providers)
            .list(Facet::Platform.key(), &self.platforms)
            .number("page", self.page)
            .number("pageSize", self.page_size);
        query.to_suffix()
    }
}

/// Parameters of `GET /policies/{name}/versions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl VersionListParams {
    /// Every version on one page.
    #[must_use]
    pub fn all() -> Self {
        Self {
            page: None,
            page_size: Some(MAX_PAGE_SIZE),
        }
    }

    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = QueryString::new();
        query
            .number("page", self.page)
            .number("pageSize", self.page_size);
        query.to_suffix()
    }
}
