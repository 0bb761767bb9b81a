//! Client for the Policy Hub catalog API.
//!
//! [`PolicyHubClient`] talks to the REST API over HTTP and normalizes every
//! failure into [`ApiError`](policyhub_model::ApiError). The state layer only
//! depends on the [`CatalogApi`] trait, which [`MockCatalog`] also implements.

pub mod api;
pub mod client;
pub mod config;
mod error;
pub mod mock;

pub use api::CatalogApi;
pub use client::PolicyHubClient;
pub use config::{
    API_URL_ENV, ClientConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, TIMEOUT_ENV,
};
pub use mock::{Endpoint, MockCatalog};
