//! Client-side state for the Policy Hub catalog browser.
//!
//! Provides:
//! - [`RequestDeduplicator`] and [`AsyncData`]: in-flight request sharing and
//!   `{data, loading, error}` resources
//! - [`AppDataStore`] and [`VersionCache`]: lazily loaded app-wide data
//! - [`FilterLocation`] and [`SearchInput`]: the location as filter state,
//!   and the debounced search box
//! - [`Route`], [`NotificationCenter`] and [`PrefsStore`]

pub mod app_data;
pub mod context;
pub mod fetch;
pub mod filters;
pub mod notify;
pub mod prefs;
pub mod routes;
pub mod search;
pub mod version_cache;
pub mod versions;

pub use app_data::{AppDataState, AppDataStore};
pub use context::AppContext;
pub use fetch::{AsyncData, CacheKey, DEDUP_GRACE, FetchState, RequestDeduplicator, SharedFetch};
pub use filters::FilterLocation;
pub use notify::{
    ErrorHandler, MAX_VISIBLE, Notification, NotificationCenter, Severity, TOAST_DURATION,
};
pub use prefs::{PrefsError, PrefsStore, default_prefs_path};
pub use routes::{Route, policy_detail, policy_version, version_change_target};
pub use search::{DEBOUNCE_DELAY, Debouncer, SearchInput};
pub use version_cache::{VERSION_CACHE_TTL, VersionCache};
pub use versions::{PolicyVersions, Stats, load_stats, version_detail_key, versions_key};
