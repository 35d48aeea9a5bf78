//! Provider plumbing for the phoenixNAP Bare Metal Cloud API.
//!
//! Resources and data sources map declarative configuration onto REST calls
//! through a typed [`api::PnapClient`], wait for asynchronous transitions
//! with [`wait`], and flatten responses into typed state. The [`provider`]
//! catalog exposes them by type name; [`serve`] answers host requests as
//! JSON lines.

pub mod api;
pub mod config;
pub mod data_sources;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod serve;
pub mod state;
pub mod test_support;
pub mod wait;

pub use api::{ApiError, PnapClient};
pub use config::{ConfigError, ProviderBlock, ProviderConfig};
pub use provider::{Provider, ProviderError, ProviderSettings};
pub use serve::{Request, ServeError};
pub use wait::{WaitError, WaitSettings};
