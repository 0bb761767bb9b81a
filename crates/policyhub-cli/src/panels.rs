//! Error presentation at three levels.
//!
//! - full-page panels replace a page whose primary data failed,
//! - inline panels sit in place of secondary data (docs, stats),
//! - toasts report background failures on stderr.

use std::fmt;

use policyhub_model::ApiError;
use policyhub_state::Notification;

/// Headings for a page's two failure modes.
#[derive(Debug, Clone, Copy)]
pub struct ErrorTitles {
    pub failed: &'static str,
    pub missing: &'static str,
}

pub const POLICIES: ErrorTitles = ErrorTitles {
    failed: "Error loading policies",
    missing: "No policies found",
};

pub const POLICY: ErrorTitles = ErrorTitles {
    failed: "Error loading policy",
    missing: "Policy not found",
};

pub const VERSION: ErrorTitles = ErrorTitles {
    failed: "Error loading policy",
    missing: "Version not found",
};

pub const VERSIONS: ErrorTitles = ErrorTitles {
    failed: "Error loading versions",
    missing: "Policy not found",
};

pub const DOCS: ErrorTitles = ErrorTitles {
    failed: "Error loading documentation",
    missing: "Documentation not available",
};

pub const CATALOG: ErrorTitles = ErrorTitles {
    failed: "Error loading catalog data",
    missing: "Not found",
};

pub const HEALTH: ErrorTitles = ErrorTitles {
    failed: "Policy Hub API unavailable",
    missing: "Health endpoint not found",
};

/// Full-page panel for a failed primary load.
#[must_use]
pub fn page_error(titles: ErrorTitles, err: &ApiError) -> String {
    if err.is_not_found() {
        return not_found(titles.missing, &err.message);
    }
    let mut panel = failure(titles.failed, err.user_message());
    panel.push_str(&format!("\n  code {} | status {}", err.code, err.status));
    if err.is_retryable() {
        panel.push_str("\n  Run the command again to retry.");
    }
    panel
}

/// Full-page panel for a failure described only by a message.
#[must_use]
pub fn failure(title: &str, message: &str) -> String {
    format!("x {title}\n  {message}")
}

/// Full-page panel for something that does not exist.
#[must_use]
pub fn not_found(title: &str, message: &str) -> String {
    let mut lines = vec![format!("? {title}")];
    if !message.is_empty() {
        lines.push(format!("  {message}"));
    }
    lines.push("  Browse all policies: /policies".to_string());
    lines.join("\n")
}

/// Compact one-line panel in place of secondary data.
#[must_use]
pub fn inline_error(title: &str, message: &str) -> String {
    format!("! {title}: {message}")
}

/// Last-resort panel; the cause is only shown when `reveal` is set.
#[must_use]
pub fn fallback(error: &dyn fmt::Display, reveal: bool) -> String {
    let mut lines = vec![
        "x Something went wrong".to_string(),
        "  An unexpected error occurred. Run the command again, or with -v for details."
            .to_string(),
    ];
    if reveal {
        lines.push(format!("  details: {error}"));
    }
    lines.join("\n")
}

#[must_use]
pub fn toast(notification: &Notification) -> String {
    format!("[{}] {}", notification.severity, notification.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_not_found_code_renders_not_found_panel() {
        let err = ApiError::new(404, "POLICY_NOT_FOUND", "Policy 'foo' does not exist");
        assert_snapshot!(page_error(POLICY, &err), @r"
        ? Policy not found
          Policy 'foo' does not exist
          Browse all policies: /policies
        ");
    }

    #[test]
    fn test_retryable_error_offers_retry() {
        let err = ApiError::timeout();
        assert_snapshot!(page_error(POLICIES, &err), @r"
        x Error loading policies
          Request timed out
          code TIMEOUT | status 408
          Run the command again to retry.
        ");
    }

    #[test]
    fn test_client_error_has_no_retry_hint() {
        let err = ApiError::new(400, "INVALID_PARAMS", "pageSize too large");
        let panel = page_error(POLICIES, &err);
        assert!(panel.contains("pageSize too large"));
        assert!(!panel.contains("retry"));
    }

    #[test]
    fn test_fallback_hides_details_unless_revealed() {
        let cause = "socket closed";
        assert!(!fallback(&cause, false).contains(cause));
        assert!(fallback(&cause, true).ends_with("details: socket closed"));
    }
}
