//! Policy records and their documentation pages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// One version of a named policy.
///
/// A policy name has many versions; at most one of them carries
/// `is_latest = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub name: String,
    pub version: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub provider: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub supported_platforms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub is_latest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Policy {
    /// Minimal record, mostly useful for fixtures.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            version: version.into(),
            description: None,
            provider: provider.into(),
            categories: Vec::new(),
            tags: Vec::new(),
            supported_platforms: Vec::new(),
            logo_url: None,
            banner_url: None,
            icon_url: None,
            release_date: None,
            is_latest: false,
            source_type: None,
            source_url: None,
        }
    }

    /// Title shown in lists, falling back to the name.
    #[must_use]
    pub fn title(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Release date as `Mon D, YYYY`, or the raw value when it does not parse.
    #[must_use]
    pub fn release_date_display(&self) -> Option<String> {
        self.release_date.as_deref().map(format_date)
    }
}

/// Formats an RFC 3339 timestamp or `YYYY-MM-DD` date for display.
#[must_use]
pub fn format_date(value: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.format("%b %-d, %Y").to_string();
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Returns the version marked latest, falling back to the first entry.
#[must_use]
pub fn latest_version(versions: &[Policy]) -> Option<&Policy> {
    versions
        .iter()
        .find(|policy| policy.is_latest)
        .or_else(|| versions.first())
}

/// Documentation page names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocsPage {
    Overview,
    Configuration,
    Examples,
    Faq,
}

impl DocsPage {
    /// All pages in tab order.
    pub const ALL: [Self; 4] = [
        Self::Overview,
        Self::Configuration,
        Self::Examples,
        Self::Faq,
    ];

    /// Path segment used by the docs endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Configuration => "configuration",
            Self::Examples => "examples",
            Self::Faq => "faq",
        }
    }

    /// Tab label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Configuration => "Configuration",
            Self::Examples => "Examples",
            Self::Faq => "FAQ",
        }
    }
}

impl fmt::Display for DocsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocsPage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|page| page.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown docs page: {value}"))
    }
}

/// Documentation content format. The API only serves markdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocsFormat {
    #[default]
    Markdown,
}

/// One documentation page of a policy version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsSingleResponse {
    pub page: DocsPage,
    #[serde(default)]
    pub format: DocsFormat,
    pub content: String,
}

/// All documentation pages of a policy version.
pub type DocsAllResponse = Vec<DocsSingleResponse>;

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_deserializes_camel_case() {
        let json = r#"{
            "name": "rate-limit",
            "version": "1.2.0",
            "displayName": "Rate Limit",
            "provider": "WSO2",
            "supportedPlatforms": ["gateway"],
            "isLatest": true
        }"#;
        let policy: Policy = serde_json::from_str(json).expect("parse policy");
        assert_eq!(policy.display_name, "Rate Limit");
        assert_eq!(policy.supported_platforms, vec!["gateway"]);
        assert!(policy.categories.is_empty());
        assert!(policy.is_latest);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05"), "Mar 5, 2024");
        assert_eq!(format_date("2024-11-20T10:00:00Z"), "Nov 20, 2024");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_latest_version_prefers_flag() {
        let mut old = Policy::new("cors", "1.0", "WSO2");
        let mut new = Policy::new("cors", "2.0", "WSO2");
        new.is_latest = true;
        old.is_latest = false;
        let versions = vec![old, new];
        assert_eq!(latest_version(&versions).map(|p| p.version.as_str()), Some("2.0"));
    }

    #[test]
    fn test_latest_version_falls_back_to_first() {
        let versions = vec![Policy::new("cors", "3.0", "WSO2"), Policy::new("cors", "1.0", "WSO2")];
        assert_eq!(latest_version(&versions).map(|p| p.version.as_str()), Some("3.0"));
        assert!(latest_version(&[]).is_none());
    }

    #[test]
    fn test_docs_page_parse() {
        assert_eq!("FAQ".parse::<DocsPage>(), Ok(DocsPage::Faq));
        assert!("changelog".parse::<DocsPage>().is_err());
    }
}
