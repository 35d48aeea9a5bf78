//! Unit tests for data source handlers.
//!
//! Lookups and queries are driven through
//! [`crate::provider::DataSourceHandler`] against a scripted transport.

mod lookups;
mod queries;
