//! Interactive policy list driven by lines of input.
//!
//! Plain lines are the current text of the search box and are committed
//! through the debounced [`SearchInput`]; lines starting with `:` are
//! commands that change the filters immediately.

use std::io::{self, Write};

use policyhub_model::{Facet, FilterUpdate, MAX_PAGE_SIZE, Page, Policy, ViewMode};
use policyhub_state::{AppContext, AsyncData, FilterLocation, SearchInput};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::pages;
use crate::panels;
use crate::render::Style;

pub const HELP: &str = "\
Type to search. Commands:
  :page N        go to page N
  :size N        show N policies per page
  :category X    toggle category X (also :provider X, :platform X)
  :view MODE     grid or list
  :clear         clear the search
  :reset         drop every filter
  :help          show this help
  :quit          leave";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Search(String),
    Page(u32),
    Size(u32),
    Toggle(Facet, String),
    View(ViewMode),
    Clear,
    Reset,
    Help,
    Quit,
    Invalid(String),
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let Some(command) = line.strip_prefix(':') else {
            return Self::Search(line.to_string());
        };
        let (name, arg) = command
            .trim()
            .split_once(char::is_whitespace)
            .map_or((command.trim(), ""), |(name, arg)| (name, arg.trim()));
        let number = || arg.parse::<u32>().ok().filter(|n| *n > 0);
        match (name, arg) {
            ("page", _) => number().map_or_else(|| Self::invalid(line), Self::Page),
            ("size", _) => number().map_or_else(|| Self::invalid(line), Self::Size),
            ("category", value) if !value.is_empty() => {
                Self::Toggle(Facet::Category, value.into())
            }
            ("provider", value) if !value.is_empty() => {
                Self::Toggle(Facet::Provider, value.into())
            }
            ("platform", value) if !value.is_empty() => {
                Self::Toggle(Facet::Platform, value.into())
            }
            ("view", "grid") => Self::View(ViewMode::Grid),
            ("view", "list") => Self::View(ViewMode::List),
            ("clear", "") => Self::Clear,
            ("reset", "") => Self::Reset,
            ("help", "") => Self::Help,
            ("quit" | "q", "") => Self::Quit,
            _ => Self::invalid(line),
        }
    }

    fn invalid(line: &str) -> Self {
        Self::Invalid(line.to_string())
    }
}

enum Step {
    Render,
    Idle,
    Quit,
}

/// Browser session state.
pub struct Browser<'a, O, N> {
    ctx: &'a AppContext,
    style: Style,
    location: FilterLocation,
    search: SearchInput,
    list: AsyncData<Page<Policy>>,
    out: O,
    notices: N,
}

impl<'a, O: Write, N: Write> Browser<'a, O, N> {
    /// Session starting at `location`; pages go to `out`, toasts and hints to `notices`.
    pub fn new(
        ctx: &'a AppContext,
        style: Style,
        location: FilterLocation,
        out: O,
        notices: N,
    ) -> Self {
        let search = SearchInput::new(location.filters().search);
        Self {
            ctx,
            style,
            location,
            search,
            list: ctx.resource(),
            out,
            notices,
        }
    }

    #[must_use]
    pub fn location(&self) -> &FilterLocation {
        &self.location
    }

    /// Reads `input` until `:quit` or end of input, rendering after each change.
    ///
    /// Search text still waiting to settle at end of input is committed
    /// before returning.
    pub async fn run<R>(&mut self, input: R) -> io::Result<FilterLocation>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.render().await?;
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        if let Some(value) = self.search.next_commit().await {
                            self.commit_search(value);
                            self.render().await?;
                        }
                        break;
                    };
                    match self.handle(Input::parse(line.trim_end())) {
                        Step::Render => self.render().await?,
                        Step::Idle => {}
                        Step::Quit => break,
                    }
                }
                Some(value) = self.search.next_commit(), if self.search.deadline().is_some() => {
                    self.commit_search(value);
                    self.render().await?;
                }
            }
        }
        self.out.flush()?;
        Ok(self.location.clone())
    }

    fn handle(&mut self, input: Input) -> Step {
        let update = match input {
            Input::Search(text) => {
                self.search.input(text);
                return Step::Idle;
            }
            Input::Page(page) => FilterUpdate::default().page(page),
            Input::Size(size) => FilterUpdate::default().page_size(size.min(MAX_PAGE_SIZE)),
            Input::Toggle(facet, value) => self.location.filters().toggle(facet, &value),
            Input::View(view_mode) => {
                self.style = self.style.with_view_mode(view_mode);
                return Step::Render;
            }
            Input::Clear => FilterUpdate::default().search(self.search.clear()),
            Input::Reset => {
                self.location.reset_filters();
                self.search.sync_external(String::new());
                return Step::Render;
            }
            Input::Help => {
                self.notice(HELP);
                return Step::Idle;
            }
            Input::Quit => return Step::Quit,
            Input::Invalid(line) => {
                self.notice(&format!("unknown command: {line} (type :help)"));
                return Step::Idle;
            }
        };
        self.location.update_filters(update);
        self.search.sync_external(self.location.filters().search);
        Step::Render
    }

    fn commit_search(&mut self, value: String) {
        self.location
            .update_filters(FilterUpdate::default().search(value));
    }

    async fn render(&mut self) -> io::Result<()> {
        let screen = pages::policies_with(self.ctx, &self.list, &self.location, &self.style).await;
        writeln!(self.out, "{}\n", screen.text)?;
        for toast in self.ctx.notifications().drain() {
            writeln!(self.notices, "{}", panels::toast(&toast))?;
        }
        Ok(())
    }

    fn notice(&mut self, text: &str) {
        if let Err(err) = writeln!(self.notices, "{text}") {
            tracing::warn!("failed to write notice: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Input::parse("jwt"), Input::Search("jwt".into()));
        assert_eq!(Input::parse(":page 3"), Input::Page(3));
        assert_eq!(
            Input::parse(":category  traffic control "),
            Input::Toggle(Facet::Category, "traffic control".into())
        );
        assert_eq!(Input::parse(":view list"), Input::View(ViewMode::List));
        assert_eq!(Input::parse(":q"), Input::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        assert_eq!(Input::parse(":page 0"), Input::Invalid(":page 0".into()));
        assert_eq!(Input::parse(":size x"), Input::Invalid(":size x".into()));
        assert_eq!(Input::parse(":provider"), Input::Invalid(":provider".into()));
        assert_eq!(Input::parse(":reset now"), Input::Invalid(":reset now".into()));
    }
}
