//! One function per page of the catalog browser.
//!
//! Every page returns a [`Screen`]; failures of the page's primary data turn
//! the whole screen into an error panel, failures of secondary data become
//! inline panels, and background failures are posted as toasts on the
//! context's notification center.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use policyhub_client::CatalogApi;
use policyhub_model::{
    DocsPage, Facet, FilterState, ListParams, Page, Policy, Result, latest_version,
};
use policyhub_state::{
    AppContext, AsyncData, CacheKey, FilterLocation, Route, load_stats, version_detail_key,
};

use crate::panels;
use crate::render::{self, Style};

/// Rendered output of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    /// The page's primary data could not be shown.
    pub failed: bool,
}

impl Screen {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failed: false,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failed: true,
        }
    }

    fn sections(sections: Vec<String>) -> Self {
        Self::ok(
            sections
                .into_iter()
                .filter(|section| !section.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    }
}

/// Wraps an API call as a repeatable fetch for [`AsyncData::load`].
fn call<T, F>(
    api: &Arc<dyn CatalogApi>,
    request: F,
) -> impl Fn() -> BoxFuture<'static, Result<T>> + Send + Sync + 'static
where
    F: Fn(Arc<dyn CatalogApi>) -> BoxFuture<'static, Result<T>> + Send + Sync + 'static,
{
    let api = Arc::clone(api);
    move || request(Arc::clone(&api))
}

fn breadcrumb(items: &[&str]) -> String {
    items.join(" > ")
}

const FEATURED_COUNT: u32 = 3;

/// `/`: headline stats and a few featured policies.
pub async fn home(ctx: &AppContext, style: &Style) -> Screen {
    tracing::info!(route = "/", "rendering page");
    let featured = ctx.resource::<Page<Policy>>();
    let fetch = call(ctx.api(), |api| {
        async move {
            api.list_policies(&ListParams::with_page_size(FEATURED_COUNT))
                .await
        }
        .boxed()
    });
    let (stats, list) = tokio::join!(
        load_stats(ctx.store()),
        featured.load(CacheKey::new("featured-policies"), fetch)
    );

    let page = match list {
        Ok(page) => page,
        Err(err) => return Screen::failed(panels::page_error(panels::POLICIES, &err)),
    };
    let stats = match stats {
        Ok(stats) => format!(
            "{} policies | {} categories | {} platforms | {} providers",
            stats.total_policies,
            stats.total_categories,
            stats.total_platforms,
            stats.total_providers
        ),
        Err(message) => panels::inline_error("Catalog stats unavailable", &message),
    };
    let featured = if page.items.is_empty() {
        "No policies published yet.".to_string()
    } else {
        render::policy_collection(&page.items, style)
    };

    Screen::sections(vec![
        render::heading("Policy Hub"),
        "Discover, compare, and reuse API gateway policies.".to_string(),
        stats,
        format!("Featured policies\n{featured}"),
        format!("All policies: {}", Route::Policies),
    ])
}

/// `/policies?...` with a fresh list resource.
pub async fn policies(ctx: &AppContext, location: &FilterLocation, style: &Style) -> Screen {
    policies_with(ctx, &ctx.resource(), location, style).await
}

/// `/policies?...`, loading the list through `resource`.
///
/// Reusing one resource across renders means a slow response for an old
/// location never replaces the list of a newer one.
pub async fn policies_with(
    ctx: &AppContext,
    resource: &AsyncData<Page<Policy>>,
    location: &FilterLocation,
    style: &Style,
) -> Screen {
    tracing::info!(location = %location, "rendering page");
    let filters = location.filters();
    let params = filters.to_list_params();
    let key = CacheKey::new(format!("policies{}", params.to_query()));
    let fetch = call(ctx.api(), move |api| {
        let params = params.clone();
        async move { api.list_policies(&params).await }.boxed()
    });
    let (data, list) = tokio::join!(ctx.store().ensure_loaded(), resource.load(key, fetch));

    if let Some(message) = &data.error {
        ctx.error_handler()
            .handle(message, Some("Could not load filter options"));
    }
    let page = match list {
        Ok(page) => page,
        Err(err) => return Screen::failed(panels::page_error(panels::POLICIES, &err)),
    };

    let options = if data.error.is_none() {
        render::filter_options(&data, &filters)
    } else {
        String::new()
    };
    let body = if page.items.is_empty() {
        "No policies found\nTry adjusting your search or filters to find what you're looking for."
            .to_string()
    } else {
        render::policy_collection(&page.items, style)
    };

    Screen::sections(vec![
        render::heading("Policies"),
        options,
        render::active_filters(&filters).unwrap_or_default(),
        body,
        render::pagination_footer(&page.pagination, location),
        format!("Location: {location}"),
    ])
}

/// `/policies/:name`: the latest version with its version list and docs.
pub async fn policy_detail(ctx: &AppContext, name: &str) -> Screen {
    tracing::info!(policy = name, "rendering page");
    let versions = ctx.policy_versions(name);
    let list = match versions.load().await {
        Ok(list) => list,
        Err(err) => return Screen::failed(panels::page_error(panels::POLICY, &err)),
    };
    let Some(latest) = latest_version(&list) else {
        return Screen::failed(panels::not_found(
            panels::POLICY.missing,
            &format!("No versions of '{name}' are published."),
        ));
    };
    let docs = doc_block(ctx, name, &latest.version).await;

    Screen::sections(vec![
        breadcrumb(&["Home", "Policies", latest.title()]),
        render::policy_header(latest),
        render::version_selector(name, &list, &latest.version, Some(&latest.version)),
        docs,
    ])
}

/// `/policies/:name/versions/:version`.
pub async fn policy_version(ctx: &AppContext, name: &str, version: &str) -> Screen {
    tracing::info!(policy = name, version, "rendering page");
    let versions = ctx.policy_versions(name);
    let detail = ctx.resource::<Policy>();
    let fetch = {
        let (name, version) = (name.to_string(), version.to_string());
        call(ctx.api(), move |api| {
            let (name, version) = (name.clone(), version.clone());
            async move { api.version_detail(&name, &version).await }.boxed()
        })
    };
    let (list, detail) = tokio::join!(
        versions.load(),
        detail.load(version_detail_key(name, version), fetch)
    );

    let (list, policy) = match (list, detail) {
        (Err(err), _) => return Screen::failed(panels::page_error(panels::POLICY, &err)),
        (Ok(_), Err(err)) => return Screen::failed(panels::page_error(panels::VERSION, &err)),
        (Ok(list), Ok(policy)) => (list, policy),
    };
    let latest = latest_version(&list).map(|p| p.version.clone());
    let docs = doc_block(ctx, name, version).await;

    Screen::sections(vec![
        breadcrumb(&[
            "Home",
            "Policies",
            policy.title(),
            &format!("Version {version}"),
        ]),
        render::policy_header(&policy),
        render::version_selector(name, &list, version, latest.as_deref()),
        docs,
    ])
}

/// Overview docs for a detail page; failures stay inline.
async fn doc_block(ctx: &AppContext, name: &str, version: &str) -> String {
    let page = DocsPage::Overview;
    let resource = ctx.resource();
    let fetch = {
        let (name, version) = (name.to_string(), version.to_string());
        call(ctx.api(), move |api| {
            let (name, version) = (name.clone(), version.clone());
            async move { api.doc_page(&name, &version, page).await }.boxed()
        })
    };
    let key = CacheKey::new(format!("docs-{name}-{version}-{page}"));
    match resource.load(key, fetch).await {
        Ok(doc) => render::doc_section(&doc),
        Err(err) if err.is_not_found() => {
            panels::inline_error(panels::DOCS.missing, &err.message)
        }
        Err(err) => panels::inline_error(panels::DOCS.failed, err.user_message()),
    }
}

/// `version`, or the latest version of `name` when absent.
async fn resolve_version(
    ctx: &AppContext,
    name: &str,
    version: Option<&str>,
) -> std::result::Result<String, Screen> {
    if let Some(version) = version {
        return Ok(version.to_string());
    }
    let list = ctx
        .policy_versions(name)
        .load()
        .await
        .map_err(|err| Screen::failed(panels::page_error(panels::POLICY, &err)))?;
    latest_version(&list)
        .map(|p| p.version.clone())
        .ok_or_else(|| {
            Screen::failed(panels::not_found(
                panels::POLICY.missing,
                &format!("No versions of '{name}' are published."),
            ))
        })
}

/// One documentation page, or every page when `page` is `None`.
pub async fn docs(
    ctx: &AppContext,
    name: &str,
    version: Option<&str>,
    page: Option<DocsPage>,
) -> Screen {
    let version = match resolve_version(ctx, name, version).await {
        Ok(version) => version,
        Err(screen) => return screen,
    };
    let api = ctx.api();
    match page {
        Some(page) => match api.doc_page(name, &version, page).await {
            Ok(doc) => Screen::ok(render::doc_section(&doc)),
            Err(err) => Screen::failed(panels::page_error(panels::DOCS, &err)),
        },
        None => match api.all_docs(name, &version).await {
            Ok(docs) if docs.is_empty() => Screen::failed(panels::not_found(
                panels::DOCS.missing,
                &format!("{name} {version} has no documentation."),
            )),
            Ok(docs) => Screen::sections(
                docs.iter()
                    .map(|doc| {
                        format!(
                            "{}\n\n{}",
                            render::heading(doc.page.label()),
                            doc.content.trim_end()
                        )
                    })
                    .collect(),
            ),
            Err(err) => Screen::failed(panels::page_error(panels::DOCS, &err)),
        },
    }
}

/// Raw YAML definition of a version.
pub async fn definition(ctx: &AppContext, name: &str, version: Option<&str>) -> Screen {
    let version = match resolve_version(ctx, name, version).await {
        Ok(version) => version,
        Err(screen) => return screen,
    };
    match ctx.api().definition(name, &version).await {
        Ok(yaml) => Screen::ok(yaml.trim_end()),
        Err(err) => Screen::failed(panels::page_error(panels::VERSION, &err)),
    }
}

/// Every version of a policy.
pub async fn versions(ctx: &AppContext, name: &str, style: &Style) -> Screen {
    match ctx.policy_versions(name).load().await {
        Ok(list) if list.is_empty() => Screen::failed(panels::not_found(
            panels::VERSIONS.missing,
            &format!("No versions of '{name}' are published."),
        )),
        Ok(list) => Screen::sections(vec![
            render::heading(&format!("Versions of {name}")),
            render::versions_table(name, &list, style),
        ]),
        Err(err) => Screen::failed(panels::page_error(panels::VERSIONS, &err)),
    }
}

/// Distinct values of one facet, each with the location filtering by it.
pub async fn facet(ctx: &AppContext, facet: Facet) -> Screen {
    let data = ctx.store().ensure_loaded().await;
    if let Some(message) = &data.error {
        return Screen::failed(panels::failure(panels::CATALOG.failed, message));
    }
    let (title, values) = match facet {
        Facet::Category => ("Categories", &data.categories),
        Facet::Provider => ("Providers", &data.providers),
        Facet::Platform => ("Platforms", &data.platforms),
    };
    if values.is_empty() {
        return Screen::ok(format!("{}\n(none)", render::heading(title)));
    }
    let width = values.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    let lines = values
        .iter()
        .map(|value| {
            let mut location = FilterLocation::new(Route::Policies.path());
            location.update_filters(FilterState::default().toggle(facet, value));
            format!("  {value:<width$}  {location}")
        })
        .collect::<Vec<_>>();
    Screen::ok(format!("{}\n{}", render::heading(title), lines.join("\n")))
}

/// API health.
pub async fn health(ctx: &AppContext) -> Screen {
    match ctx.api().health().await {
        Ok(status) if status.timestamp.is_empty() => {
            Screen::ok(format!("Policy Hub API: {}", status.status))
        }
        Ok(status) => Screen::ok(format!(
            "Policy Hub API: {} (as of {})",
            status.status, status.timestamp
        )),
        Err(err) => Screen::failed(panels::page_error(panels::HEALTH, &err)),
    }
}

/// `/about`: what the hub is, with live stats inline.
pub async fn about(ctx: &AppContext) -> Screen {
    tracing::info!(route = "/about", "rendering page");
    let stats = match load_stats(ctx.store()).await {
        Ok(stats) => [
            format!("Available policies      {}", stats.total_policies),
            format!("Categories              {}", stats.total_categories),
            format!("Supported platforms     {}", stats.total_platforms),
            format!(
                "Community contributors  {}",
                stats.total_providers.saturating_sub(1)
            ),
        ]
        .join("\n"),
        Err(message) => panels::inline_error("Catalog stats unavailable", &message),
    };
    Screen::sections(vec![
        breadcrumb(&["Home", "About"]),
        render::heading("About Policy Hub"),
        "The central repository for API management policies. Browse policies by \
         category, provider, and platform, compare versions, and read their \
         documentation and definitions."
            .to_string(),
        stats,
    ])
}

const GUIDE: &str = "\
A custom policy is a versioned package with three parts:

  policy-definition.yaml   name, version, parameters, and supported platforms
  docs/                    overview, configuration, examples, and faq pages
  assets/                  optional logo and banner images

1. Pick a unique kebab-case name and start at version 1.0.0.
2. Describe every parameter in the definition with its type and default.
3. Write the four documentation pages in markdown.
4. Validate the package locally, then open a pull request against the
   policy hub repository.
5. Publish a new version for every change; published versions are immutable
   and the newest one is served as latest.

Questions: https://stackoverflow.com/questions/tagged/wso2
Documentation: https://docs.wso2.com/";

/// `/custom-policy-guide`.
#[must_use]
pub fn guide() -> Screen {
    Screen::sections(vec![
        breadcrumb(&["Home", "Custom Policy Guide"]),
        render::heading("Custom Policy Development Guide"),
        GUIDE.to_string(),
    ])
}

/// Renders whatever page `href` names.
pub async fn open(ctx: &AppContext, href: &str, style: &Style) -> Screen {
    match Route::parse(href) {
        Route::Home => home(ctx, style).await,
        Route::Policies => policies(ctx, &FilterLocation::parse(href), style).await,
        Route::PolicyDetail { name } => policy_detail(ctx, &name).await,
        Route::PolicyVersion { name, version } => policy_version(ctx, &name, &version).await,
        Route::CustomPolicyGuide => guide(),
        Route::About => about(ctx).await,
        Route::NotFound(path) => Screen::failed(panels::not_found(
            "Page not found",
            &format!("Nothing lives at {path}."),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_skip_empty_parts() {
        let screen = Screen::sections(vec!["a".into(), String::new(), "b".into()]);
        assert_eq!(screen.text, "a\n\nb");
        assert!(!screen.failed);
    }

    #[test]
    fn test_guide_is_static() {
        let screen = guide();
        assert!(screen.text.starts_with("Home > Custom Policy Guide"));
        assert!(screen.text.contains("policy-definition.yaml"));
    }
}
