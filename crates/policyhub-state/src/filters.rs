//! The location as the source of truth for list filters.

use std::fmt;

use policyhub_model::{FilterState, FilterUpdate};

/// Path plus query string of the current view.
///
/// Filters are never stored separately: [`filters`](Self::filters) decodes
/// the query on every read and every update writes a fresh query string, so
/// parameters from an earlier state cannot linger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLocation {
    path: String,
    query: String,
}

impl FilterLocation {
    /// Location at `path` with no query.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: String::new(),
        }
    }

    /// Splits `path?query`; a missing path means `/`.
    #[must_use]
    pub fn parse(href: &str) -> Self {
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Filters decoded from the current query.
    #[must_use]
    pub fn filters(&self) -> FilterState {
        FilterState::from_query(&self.query)
    }

    /// Applies a partial update and rewrites the whole query string.
    pub fn update_filters(&mut self, update: FilterUpdate) -> FilterState {
        let next = self.filters().apply(update);
        self.set_filters(&next);
        next
    }

    /// Replaces the query with the encoding of `filters`.
    pub fn set_filters(&mut self, filters: &FilterState) {
        self.query = filters.to_query();
        tracing::debug!(location = %self, "filters updated");
    }

    /// Drops every query parameter.
    pub fn reset_filters(&mut self) {
        self.query.clear();
        tracing::debug!(location = %self, "filters reset");
    }

    /// `path` or `path?query`.
    #[must_use]
    pub fn href(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FilterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_update_replaces_query() {
        let mut location = FilterLocation::parse("/policies?search=jwt&page=3&utm=x");
        let next = location
            .update_filters(FilterUpdate::default().categories(vec!["security".to_string()]));
        assert_eq!(next.page, 1);
        assert_snapshot!(location.href(), @"/policies?search=jwt&categories=security");
    }

    #[test]
    fn test_reset_yields_bare_path() {
        let mut location = FilterLocation::parse("/policies?search=jwt");
        location.reset_filters();
        assert_eq!(location.href(), "/policies");
        assert_eq!(location.filters(), FilterState::default());
    }

    #[test]
    fn test_parse_without_path() {
        let location = FilterLocation::parse("?page=2");
        assert_eq!(location.path(), "/");
        assert_eq!(location.filters().page, 2);
    }
}
