//! Command-line interface definitions for the `pnap-provider` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `pnap-provider` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pnap-provider",
    about = "Manage phoenixNAP Bare Metal Cloud infrastructure declaratively",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Print every resource and data source schema as JSON.
    #[command(name = "schema", about = "Print every resource and data source schema as JSON")]
    Schema,
    /// Answer JSON-lines requests on stdin.
    #[command(name = "serve", about = "Answer JSON-lines requests on stdin")]
    Serve(ServeCommand),
}

/// Arguments for the `pnap-provider serve` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ServeCommand {
    /// Configure the provider from the environment before the first request.
    ///
    /// Credentials resolve from `PNAP_CLIENT_ID` and `PNAP_CLIENT_SECRET`,
    /// then `PNAP_CONFIG_FILE_PATH`, then `$HOME/.pnap/config.yaml`.
    #[arg(long)]
    pub(crate) configure: bool,
}
