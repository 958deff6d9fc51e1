//! Palco Client - HTTP client for the marketplace API
//!
//! Provides the typed REST surface the workflow board consumes, over either
//! a real network transport or an in-process router for tests.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "in-process")]
pub mod oneshot;

pub use api::{MarketplaceApi, RestMarketplace};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};
#[cfg(feature = "in-process")]
pub use oneshot::OneshotHttpClient;
