//! Text rendering of catalog data.
//!
//! Everything here returns plain `String`s so pages can be snapshot-tested;
//! colour only ever comes from table cells, and only when [`Style::color`]
//! is on.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use policyhub_model::{
    DocsSingleResponse, FilterState, FilterUpdate, PaginationMeta, Policy, Preferences, Theme,
    ViewMode,
};
use policyhub_state::{AppDataState, FilterLocation, version_change_target};

/// How pages are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub color: bool,
}

impl Style {
    #[must_use]
    pub fn new(prefs: Preferences, color: bool) -> Self {
        Self {
            theme: prefs.theme,
            view_mode: prefs.view_mode,
            color,
        }
    }

    /// Default preferences without colour.
    #[must_use]
    pub fn plain() -> Self {
        Self::new(Preferences::default(), false)
    }

    #[must_use]
    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    fn accent(&self) -> Color {
        match self.theme {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::Cyan,
        }
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        apply_table_style(&mut table);
        if self.color {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }
        table
    }

    fn header_cell(&self, label: &str) -> Cell {
        Cell::new(label)
            .fg(self.accent())
            .add_attribute(Attribute::Bold)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

/// Title followed by an underline of the same width.
#[must_use]
pub fn heading(title: &str) -> String {
    format!("{title}\n{}", "=".repeat(title.chars().count()))
}

fn joined(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Policies in the preferred layout.
#[must_use]
pub fn policy_collection(policies: &[Policy], style: &Style) -> String {
    match style.view_mode {
        ViewMode::Grid => policy_grid(policies, style),
        ViewMode::List => policy_list(policies),
    }
}

/// One row per policy.
#[must_use]
pub fn policy_grid(policies: &[Policy], style: &Style) -> String {
    let mut table = style.table();
    table.set_header(vec![
        style.header_cell("Policy"),
        style.header_cell("Version"),
        style.header_cell("Provider"),
        style.header_cell("Categories"),
        style.header_cell("Platforms"),
    ]);
    for policy in policies {
        table.add_row(vec![
            Cell::new(format!("{}\n{}", policy.title(), policy.name)),
            Cell::new(&policy.version).set_alignment(CellAlignment::Center),
            Cell::new(&policy.provider),
            Cell::new(joined(&policy.categories)),
            if policy.supported_platforms.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(policy.supported_platforms.join(", "))
            },
        ]);
    }
    table.to_string()
}

/// One block per policy, with description and location.
#[must_use]
pub fn policy_list(policies: &[Policy]) -> String {
    policies
        .iter()
        .map(|policy| {
            let mut lines = vec![format!(
                "{} ({} {})",
                policy.title(),
                policy.name,
                policy.version
            )];
            if let Some(description) = policy.description.as_deref().filter(|d| !d.is_empty()) {
                lines.push(format!("  {description}"));
            }
            lines.push(format!(
                "  Provider: {} | Categories: {} | Platforms: {}",
                policy.provider,
                joined(&policy.categories),
                joined(&policy.supported_platforms)
            ));
            let mut last = format!("  {}", policyhub_state::policy_detail(&policy.name));
            if let Some(released) = policy.release_date_display() {
                last = format!("  Released {released} | {}", last.trim_start());
            }
            lines.push(last);
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Header block of a policy detail page.
#[must_use]
pub fn policy_header(policy: &Policy) -> String {
    let latest = if policy.is_latest { " (latest)" } else { "" };
    let mut lines = vec![
        heading(policy.title()),
        format!(
            "{} | version {}{latest} | by {}",
            policy.name, policy.version, policy.provider
        ),
    ];
    if let Some(description) = policy.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    lines.push(String::new());
    lines.push(format!("Categories: {}", joined(&policy.categories)));
    if !policy.tags.is_empty() {
        lines.push(format!("Tags: {}", policy.tags.join(", ")));
    }
    lines.push(format!("Platforms: {}", joined(&policy.supported_platforms)));
    if let Some(released) = policy.release_date_display() {
        lines.push(format!("Released: {released}"));
    }
    if let Some(url) = &policy.source_url {
        match &policy.source_type {
            Some(kind) => lines.push(format!("Source: {url} ({kind})")),
            None => lines.push(format!("Source: {url}")),
        }
    }
    lines.join("\n")
}

/// Version picker: every version with the location selecting it leads to.
#[must_use]
pub fn version_selector(
    name: &str,
    versions: &[Policy],
    current: &str,
    latest: Option<&str>,
) -> String {
    let width = versions
        .iter()
        .map(|v| v.version.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = vec!["Versions".to_string()];
    for version in versions {
        let marker = if version.version == current { '*' } else { ' ' };
        let tag = if latest == Some(version.version.as_str()) {
            " (latest)"
        } else {
            "         "
        };
        let target = version_change_target(name, &version.version, latest);
        lines.push(format!(
            "  {marker} {:<width$}{tag}  {target}",
            version.version
        ));
    }
    lines.join("\n")
}

/// Every version of a policy as a table.
#[must_use]
pub fn versions_table(name: &str, versions: &[Policy], style: &Style) -> String {
    let latest = policyhub_model::latest_version(versions).map(|p| p.version.as_str());
    let mut table = style.table();
    table.set_header(vec![
        style.header_cell("Version"),
        style.header_cell("Latest"),
        style.header_cell("Released"),
        style.header_cell("Location"),
    ]);
    for version in versions {
        let is_latest = latest == Some(version.version.as_str());
        table.add_row(vec![
            Cell::new(&version.version),
            if is_latest {
                Cell::new("yes").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            version
                .release_date_display()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(version_change_target(name, &version.version, latest)),
        ]);
    }
    table.to_string()
}

/// One documentation page under a tab bar naming every page.
#[must_use]
pub fn doc_section(doc: &DocsSingleResponse) -> String {
    let tabs = policyhub_model::DocsPage::ALL
        .iter()
        .map(|page| {
            if *page == doc.page {
                format!("[{}]", page.label())
            } else {
                page.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("Documentation  {tabs}\n\n{}", doc.content.trim_end())
}

/// `Showing a-b of n policies`, the page position, and neighbouring locations.
#[must_use]
pub fn pagination_footer(meta: &PaginationMeta, location: &FilterLocation) -> String {
    let Some((start, end)) = meta.item_range() else {
        return format!("Showing 0 of {} policies", meta.total_items);
    };
    let mut lines = vec![format!(
        "Showing {start}-{end} of {} policies (page {} of {})",
        meta.total_items,
        meta.page,
        meta.total_pages.max(1)
    )];
    if meta.has_previous() {
        lines.push(format!(
            "Previous: {}",
            with_page(location, meta.page.saturating_sub(1))
        ));
    }
    if meta.has_next() {
        lines.push(format!("Next: {}", with_page(location, meta.page + 1)));
    }
    lines.join("\n")
}

fn with_page(location: &FilterLocation, page: u32) -> String {
    let mut target = location.clone();
    target.update_filters(FilterUpdate::default().page(page));
    target.href()
}

/// Active search and facet filters, or `None` when nothing is filtered.
#[must_use]
pub fn active_filters(filters: &FilterState) -> Option<String> {
    if !filters.has_active_filters() {
        return None;
    }
    let mut parts = Vec::new();
    if !filters.search.trim().is_empty() {
        parts.push(format!("search \"{}\"", filters.search.trim()));
    }
    for (label, values) in [
        ("category", &filters.categories),
        ("provider", &filters.providers),
        ("platform", &filters.platforms),
    ] {
        parts.extend(values.iter().map(|value| format!("{label} {value}")));
    }
    Some(format!(
        "Active filters ({}): {}",
        filters.active_count(),
        parts.join(", ")
    ))
}

/// Facet values with the selected ones ticked.
#[must_use]
pub fn filter_options(data: &AppDataState, filters: &FilterState) -> String {
    [
        ("Categories", &data.categories, &filters.categories),
        ("Providers", &data.providers, &filters.providers),
        ("Platforms", &data.platforms, &filters.platforms),
    ]
    .into_iter()
    .map(|(label, options, selected)| {
        let values = if options.is_empty() {
            "-".to_string()
        } else {
            options
                .iter()
                .map(|option| {
                    let mark = if selected.contains(option) { 'x' } else { ' ' };
                    format!("[{mark}] {option}")
                })
                .collect::<Vec<_>>()
                .join("  ")
        };
        format!("{label}: {values}")
    })
    .collect::<Vec<_>>()
    .join("\n")
}
