//! CLI argument definitions for the Policy Hub browser.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use policyhub_model::{DocsPage, FilterState, Theme, ViewMode};

#[derive(Parser)]
#[command(
    name = "policyhub",
    version,
    about = "Policy Hub - browse the API policy catalog from a terminal",
    long_about = "Browse, search, and inspect policies published to a Policy Hub.\n\n\
                  The API location comes from --api-url, then POLICYHUB_API_URL, \
                  then http://localhost:8080."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Base URL of the Policy Hub API.
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long = "timeout-ms", value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Preferences file (default: the platform config directory).
    #[arg(long = "prefs-file", value_name = "PATH", global = true)]
    pub prefs_file: Option<PathBuf>,

    /// Policy layout for this run, overriding the saved preference.
    #[arg(long = "view", value_enum, global = true)]
    pub view: Option<ViewArg>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Headline stats and featured policies.
    Home,

    /// List policies, filtered and paginated.
    Policies(ListArgs),

    /// Latest version of a policy with its versions and overview docs.
    Policy {
        name: String,
    },

    /// One specific version of a policy.
    Version {
        name: String,
        version: String,
    },

    /// Documentation pages of a policy version.
    Docs {
        name: String,
        /// Version to read (default: latest).
        version: Option<String>,
        /// Single page to show (default: all pages).
        #[arg(long = "page", value_enum)]
        page: Option<DocsPageArg>,
    },

    /// Raw YAML definition of a policy version.
    Definition {
        name: String,
        /// Version to read (default: latest).
        version: Option<String>,
    },

    /// Every version of a policy.
    Versions {
        name: String,
    },

    /// Known policy categories.
    Categories,

    /// Known policy providers.
    Providers,

    /// Known deployment platforms.
    Platforms,

    /// Check that the API is up.
    Health,

    /// Catalog stats.
    #[command(visible_alias = "stats")]
    About,

    /// How to build and publish a custom policy.
    Guide,

    /// Render any location, e.g. `/policies?categories=security&page=2`.
    Open {
        #[arg(value_name = "LOCATION")]
        location: String,
    },

    /// Search and filter interactively; reads lines from stdin.
    Browse {
        /// Starting location.
        #[arg(value_name = "LOCATION", default_value = "/policies")]
        location: String,
    },

    /// Show or change display preferences.
    Prefs(PrefsArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Free-text search.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Category filter; repeat or comma-separate for several.
    #[arg(long = "category", value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Provider filter; repeat or comma-separate for several.
    #[arg(long = "provider", value_delimiter = ',')]
    pub providers: Vec<String>,

    /// Platform filter; repeat or comma-separate for several.
    #[arg(long = "platform", value_delimiter = ',')]
    pub platforms: Vec<String>,

    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Policies per page.
    #[arg(
        long = "page-size",
        default_value_t = policyhub_model::DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(policyhub_model::MAX_PAGE_SIZE))
    )]
    pub page_size: u32,
}

impl ListArgs {
    /// Filters these flags select.
    #[must_use]
    pub fn filters(&self) -> FilterState {
        FilterState {
            search: self.search.clone().unwrap_or_default(),
            categories: self.categories.clone(),
            providers: self.providers.clone(),
            platforms: self.platforms.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Args)]
pub struct PrefsArgs {
    /// Set the theme.
    #[arg(long, value_enum, conflicts_with = "toggle_theme")]
    pub theme: Option<ThemeArg>,

    /// Switch between light and dark.
    #[arg(long = "toggle-theme")]
    pub toggle_theme: bool,

    /// Set the default policy layout.
    #[arg(long = "view-mode", value_enum)]
    pub view_mode: Option<ViewArg>,
}

impl PrefsArgs {
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.theme.is_some() || self.toggle_theme || self.view_mode.is_some()
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ViewArg {
    Grid,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Grid => Self::Grid,
            ViewArg::List => Self::List,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DocsPageArg {
    Overview,
    Configuration,
    Examples,
    Faq,
}

impl From<DocsPageArg> for DocsPage {
    fn from(arg: DocsPageArg) -> Self {
        match arg {
            DocsPageArg::Overview => Self::Overview,
            DocsPageArg::Configuration => Self::Configuration,
            DocsPageArg::Examples => Self::Examples,
            DocsPageArg::Faq => Self::Faq,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
