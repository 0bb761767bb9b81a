//! Data model shared by the Policy Hub client, state layer, and CLI.

pub mod error;
pub mod filter;
pub mod policy;
pub mod preferences;
pub mod query;
pub mod response;

pub use error::{ApiError, ErrorCode, ErrorObject, Result};
pub use filter::{
    DEFAULT_PAGE_SIZE, Facet, FilterState, FilterUpdate, ListParams, MAX_PAGE_SIZE,
    VersionListParams,
};
pub use policy::{
    DocsAllResponse, DocsFormat, DocsPage, DocsSingleResponse, HealthStatus, Policy, format_date,
    latest_version,
};
pub use preferences::{Preferences, Theme, ViewMode};
pub use query::encode_component;
pub use response::{
    BaseResponse, Envelope, Page, PaginatedMeta, PaginatedResponse, PaginationMeta, ResponseMeta,
};
