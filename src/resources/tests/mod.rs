//! Unit tests for resource handlers.
//!
//! Handlers are driven through [`crate::provider::ResourceHandler`] against
//! a scripted transport; each submodule covers one resource family.

mod billing;
mod fixtures;
mod ip_block;
mod networks;
mod server;
