//! Query-string encoding shared by the API client and the location codec.
//!
//! Values are percent-encoded with the same unreserved set as
//! `encodeURIComponent`; list values are encoded item by item and joined with
//! a literal `,` so list parameters stay readable (`categories=a,b`).

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in path segments and query values.
pub const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Separator used for list-valued parameters.
pub const LIST_SEPARATOR: char = ',';

/// [`COMPONENT`] minus the list separator, which stays literal in list values.
const LIST_COMPONENT: &AsciiSet = &COMPONENT.remove(LIST_SEPARATOR as u8);

/// Percent-encodes a single path segment or query value.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Ordered builder for `key=value&...` query strings.
///
/// Empty strings and empty lists are skipped, so absent values never show up
/// as `key=` in the output.
#[derive(Debug, Default, Clone)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text value; blank values are dropped.
    pub fn text(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.pairs.push((key.to_string(), encode_component(value)));
        }
        self
    }

    /// Appends a comma-joined list; empty lists and empty items are dropped.
    ///
    /// Items are joined before encoding, so a `,` inside an item reads back
    /// as a separator, the same as the join itself.
    pub fn list<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        let items: Vec<&str> = values
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !v.is_empty())
            .collect();
        if !items.is_empty() {
            let joined = items.join(&LIST_SEPARATOR.to_string());
            self.pairs.push((
                key.to_string(),
                utf8_percent_encode(&joined, LIST_COMPONENT).to_string(),
            ));
        }
        self
    }

    /// Appends a number when present.
    pub fn number(&mut self, key: &str, value: Option<u32>) -> &mut Self {
        if let Some(value) = value {
            self.pairs.push((key.to_string(), value.to_string()));
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encoded pairs without a leading `?`.
    #[must_use]
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Encoded pairs with a leading `?`, or an empty string.
    #[must_use]
    pub fn to_suffix(&self) -> String {
        if self.pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", self.encode())
        }
    }
}

/// Decoded view over a query string. The first occurrence of a key wins.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parses `a=1&b=2`, with or without a leading `?`.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Splits a list parameter, trimming items and discarding empty ones.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(LIST_SEPARATOR)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parses a positive integer parameter, falling back when missing or malformed.
    #[must_use]
    pub fn positive(&self, key: &str, fallback: u32) -> u32 {
        self.get(key)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|value| *value >= 1)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_matches_uri_component() {
        assert_eq!(encode_component("jwt auth/v2"), "jwt%20auth%2Fv2");
        assert_eq!(encode_component("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_component("x,y"), "x%2Cy");
    }

    #[test]
    fn test_builder_skips_empty_values() {
        let mut query = QueryString::new();
        query
            .text("search", Some(""))
            .list::<&str>("categories", &[])
            .list("providers", &["", "wso2"])
            .number("page", None)
            .number("pageSize", Some(1));
        assert_eq!(query.encode(), "providers=wso2&pageSize=1");
    }

    #[test]
    fn test_comma_inside_item_stays_literal() {
        let mut query = QueryString::new();
        query.list("categories", &["a,b", "rate limit"]);
        assert_eq!(query.encode(), "categories=a,b,rate%20limit");
        assert_eq!(
            QueryParams::parse(&query.encode()).list("categories"),
            vec!["a", "b", "rate limit"]
        );
    }

    #[test]
    fn test_empty_builder_has_no_suffix() {
        assert_eq!(QueryString::new().to_suffix(), "");
    }

    #[test]
    fn test_params_first_value_wins() {
        let params = QueryParams::parse("?page=3&page=9&search=a+b");
        assert_eq!(params.get("page"), Some("3"));
        assert_eq!(params.get("search"), Some("a b"));
    }

    #[test]
    fn test_positive_fallbacks() {
        let params = QueryParams::parse("page=0&pageSize=abc&x=7");
        assert_eq!(params.positive("page", 1), 1);
        assert_eq!(params.positive("pageSize", 20), 20);
        assert_eq!(params.positive("x", 1), 7);
        assert_eq!(params.positive("missing", 5), 5);
    }
}
