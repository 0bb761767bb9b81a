//! Client routes and version navigation.

use std::fmt;

use percent_encoding::percent_decode_str;
use policyhub_model::encode_component;

/// A page of the catalog browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Home,
    /// `/policies`
    Policies,
    /// `/policies/:name`
    PolicyDetail { name: String },
    /// `/policies/:name/versions/:version`
    PolicyVersion { name: String, version: String },
    /// `/custom-policy-guide`
    CustomPolicyGuide,
    /// `/about`
    About,
    /// Anything else; keeps the requested path.
    NotFound(String),
}

impl Route {
    /// Matches a path. Any query string is ignored.
    #[must_use]
    pub fn parse(href: &str) -> Self {
        let path = href.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        let decoded: Option<Vec<String>> = segments.iter().map(|s| decode(s)).collect();
        let Some(segments) = decoded else {
            return Self::NotFound(path.to_string());
        };

        match segments.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            [] => Self::Home,
            ["policies"] => Self::Policies,
            ["policies", name] if !name.is_empty() => Self::PolicyDetail {
                name: (*name).to_string(),
            },
            ["policies", name, "versions", version] if !name.is_empty() && !version.is_empty() => {
                Self::PolicyVersion {
                    name: (*name).to_string(),
                    version: (*version).to_string(),
                }
            }
            ["custom-policy-guide"] => Self::CustomPolicyGuide,
            ["about"] => Self::About,
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// Path of the route with encoded parameters.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Policies => "/policies".to_string(),
            Self::PolicyDetail { name } => policy_detail(name),
            Self::PolicyVersion { name, version } => policy_version(name, version),
            Self::CustomPolicyGuide => "/custom-policy-guide".to_string(),
            Self::About => "/about".to_string(),
            Self::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn decode(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

/// `/policies/:name`
#[must_use]
pub fn policy_detail(name: &str) -> String {
    format!("/policies/{}", encode_component(name))
}

/// `/policies/:name/versions/:version`
#[must_use]
pub fn policy_version(name: &str, version: &str) -> String {
    format!(
        "/policies/{}/versions/{}",
        encode_component(name),
        encode_component(version)
    )
}

/// Where selecting `selected` in the version picker leads.
///
/// The latest version lives at the policy's own page; every other version
/// has a versioned URL.
#[must_use]
pub fn version_change_target(name: &str, selected: &str, latest: Option<&str>) -> Route {
    if latest == Some(selected) {
        Route::PolicyDetail {
            name: name.to_string(),
        }
    } else {
        Route::PolicyVersion {
            name: name.to_string(),
            version: selected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/policies?page=2"), Route::Policies);
        assert_eq!(Route::parse("/policies/"), Route::Policies);
        assert_eq!(
            Route::parse("/policies/jwt%20auth/versions/1.0"),
            Route::PolicyVersion {
                name: "jwt auth".to_string(),
                version: "1.0".to_string()
            }
        );
        assert_eq!(Route::parse("/about"), Route::About);
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(
            Route::parse("/policies/x/y"),
            Route::NotFound("/policies/x/y".to_string())
        );
        assert!(matches!(Route::parse("/nope"), Route::NotFound(_)));
    }

    #[test]
    fn test_path_round_trip() {
        let route = Route::PolicyDetail {
            name: "rate/limit".to_string(),
        };
        assert_eq!(route.path(), "/policies/rate%2Flimit");
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn test_version_change_target() {
        assert_eq!(
            version_change_target("cors", "2.0", Some("2.0")).path(),
            "/policies/cors"
        );
        assert_eq!(
            version_change_target("cors", "1.0", Some("2.0")).path(),
            "/policies/cors/versions/1.0"
        );
        assert_eq!(
            version_change_target("cors", "1.0", None).path(),
            "/policies/cors/versions/1.0"
        );
    }
}
