//! Toast notifications.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use policyhub_model::ApiError;
use tokio::time::Instant;

/// How long a toast stays visible by default.
pub const TOAST_DURATION: Duration = Duration::from_secs(6);

/// How many toasts are visible at once by default.
pub const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

impl Severity {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    /// Zero means the toast stays until dismissed.
    pub duration: Duration,
    pub created_at: Instant,
}

impl Notification {
    fn expired(&self, now: Instant) -> bool {
        !self.duration.is_zero() && now >= self.created_at + self.duration
    }
}

#[derive(Debug)]
struct CenterInner {
    max_visible: usize,
    next_id: AtomicU64,
    items: Mutex<VecDeque<Notification>>,
}

/// Stack of toasts, newest first.
///
/// Adding beyond the visible limit evicts the oldest toast. Expired toasts
/// disappear from [`visible`](Self::visible). Clones share the same stack.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Arc<CenterInner>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_limit(MAX_VISIBLE)
    }
}

impl NotificationCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(max_visible: usize) -> Self {
        Self {
            inner: Arc::new(CenterInner {
                max_visible: max_visible.max(1),
                next_id: AtomicU64::new(1),
                items: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Shows a toast for `duration` and returns its id.
    pub fn show(&self, message: impl Into<String>, severity: Severity, duration: Duration) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            duration,
            created_at: Instant::now(),
        };
        let mut items = self.inner.items.lock();
        items.push_front(notification);
        items.truncate(self.inner.max_visible);
        id
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Error, TOAST_DURATION)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Warning, TOAST_DURATION)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Info, TOAST_DURATION)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Success, TOAST_DURATION)
    }

    pub fn dismiss(&self, id: u64) {
        self.inner.items.lock().retain(|n| n.id != id);
    }

    pub fn clear_all(&self) {
        self.inner.items.lock().clear();
    }

    /// Toasts still showing, newest first.
    #[must_use]
    pub fn visible(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut items = self.inner.items.lock();
        items.retain(|n| !n.expired(now));
        items.iter().cloned().collect()
    }

    /// Removes and returns every toast currently showing.
    pub fn drain(&self) -> Vec<Notification> {
        let visible = self.visible();
        self.clear_all();
        visible
    }
}

/// Turns errors into error toasts.
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    notifications: NotificationCenter,
}

impl ErrorHandler {
    #[must_use]
    pub fn new(notifications: NotificationCenter) -> Self {
        Self { notifications }
    }

    /// Posts `context: message` as an error toast and returns the text.
    pub fn handle(&self, message: &str, context: Option<&str>) -> String {
        let text = match context {
            Some(context) => format!("{context}: {message}"),
            None => message.to_string(),
        };
        tracing::debug!(%text, "error notification");
        self.notifications.error(text.clone());
        text
    }

    /// Like [`handle`](Self::handle) for an API error.
    pub fn handle_api_error(&self, err: &ApiError, context: Option<&str>) -> String {
        self.handle(&err.message, context)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }
}
