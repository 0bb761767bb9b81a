//! Command dispatch.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ColorChoice;
use policyhub_cli::browse::Browser;
use policyhub_cli::pages::{self, Screen};
use policyhub_cli::panels;
use policyhub_cli::render::Style;
use policyhub_client::{ClientConfig, PolicyHubClient};
use policyhub_model::{Facet, Preferences};
use policyhub_state::{AppContext, FilterLocation, PrefsStore, Route};

use crate::cli::{Cli, Command, PrefsArgs};

/// Runs the selected command and returns the process exit code.
pub async fn execute(cli: Cli) -> Result<i32> {
    let store = prefs_store(&cli);
    let color = color_enabled(&cli);
    let command = match cli.command {
        Command::Prefs(args) => {
            print_screen(&prefs(&store?, &args)?);
            return Ok(0);
        }
        command => command,
    };

    let prefs = match &store {
        Ok(store) => store.load(),
        Err(error) => {
            tracing::warn!("preferences unavailable, using defaults: {error:#}");
            Preferences::default()
        }
    };
    let mut style = Style::new(prefs, color);
    if let Some(view) = cli.view {
        style = style.with_view_mode(view.into());
    }

    let config = client_config(cli.api_url.as_deref(), cli.timeout_ms)?;
    tracing::info!(base_url = %config.base_url, "using Policy Hub API");
    let client = PolicyHubClient::new(config).context("invalid API configuration")?;
    let ctx = AppContext::new(Arc::new(client));

    let screen = match command {
        Command::Home => pages::home(&ctx, &style).await,
        Command::Policies(args) => {
            let mut location = FilterLocation::new(Route::Policies.path());
            location.set_filters(&args.filters());
            pages::policies(&ctx, &location, &style).await
        }
        Command::Policy { name } => pages::policy_detail(&ctx, &name).await,
        Command::Version { name, version } => pages::policy_version(&ctx, &name, &version).await,
        Command::Docs {
            name,
            version,
            page,
        } => pages::docs(&ctx, &name, version.as_deref(), page.map(Into::into)).await,
        Command::Definition { name, version } => {
            pages::definition(&ctx, &name, version.as_deref()).await
        }
        Command::Versions { name } => pages::versions(&ctx, &name, &style).await,
        Command::Categories => pages::facet(&ctx, Facet::Category).await,
        Command::Providers => pages::facet(&ctx, Facet::Provider).await,
        Command::Platforms => pages::facet(&ctx, Facet::Platform).await,
        Command::Health => pages::health(&ctx).await,
        Command::About => pages::about(&ctx).await,
        Command::Guide => pages::guide(),
        Command::Open { location } => pages::open(&ctx, &location, &style).await,
        Command::Browse { location } => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut browser = Browser::new(
                &ctx,
                style,
                FilterLocation::parse(&location),
                io::stdout(),
                io::stderr(),
            );
            let last = browser.run(input).await.context("browse session failed")?;
            tracing::info!(location = %last, "browse session ended");
            return Ok(0);
        }
        Command::Prefs(_) => return Ok(0),
    };

    print_screen(&screen);
    for toast in ctx.notifications().drain() {
        eprintln!("{}", panels::toast(&toast));
    }
    Ok(if screen.failed { 1 } else { 0 })
}

fn print_screen(screen: &Screen) {
    println!("{}", screen.text);
}

/// Environment first, then command-line overrides.
fn client_config(api_url: Option<&str>, timeout_ms: Option<u64>) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid API environment")?;
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }
    if let Some(ms) = timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    config.validate().context("invalid API configuration")?;
    Ok(config)
}

fn prefs_store(cli: &Cli) -> Result<PrefsStore> {
    match &cli.prefs_file {
        Some(path) => Ok(PrefsStore::at(path.clone())),
        None => PrefsStore::open_default().context("no preferences location"),
    }
}

fn color_enabled(cli: &Cli) -> bool {
    match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stdout().is_terminal(),
    }
}

fn prefs(store: &PrefsStore, args: &PrefsArgs) -> Result<Screen> {
    let prefs = if args.is_change() {
        store
            .update(|prefs| {
                if let Some(theme) = args.theme {
                    prefs.theme = theme.into();
                }
                if args.toggle_theme {
                    prefs.theme = prefs.theme.toggled();
                }
                if let Some(view) = args.view_mode {
                    prefs.view_mode = view.into();
                }
            })
            .context("failed to save preferences")?
    } else {
        store.load()
    };
    Ok(Screen::ok(format!(
        "theme: {}\nview mode: {}\nfile: {}",
        prefs.theme,
        prefs.view_mode,
        store.path().display()
    )))
}
