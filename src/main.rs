//! Binary entry point for the phoenixNAP provider.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pnap_provider::config::{ConfigError, ProviderConfig};
use pnap_provider::provider::{Provider, ProviderError};
use pnap_provider::serve::{ServeError, serve};

mod cli;

use cli::{Cli, ServeCommand};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PNAP_LOG";

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("serve error: {0}")]
    Serve(#[from] ServeError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode schemas: {0}")]
    Encode(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

/// Logs go to stderr so stdout carries only protocol output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli {
        Cli::Schema => write_schema(io::stdout(), &Provider::default()),
        Cli::Serve(command) => serve_stdio(&command).await,
    }
}

fn write_schema(mut target: impl Write, provider: &Provider) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(&provider.schemas())?;
    writeln!(target, "{rendered}")?;
    Ok(())
}

async fn serve_stdio(command: &ServeCommand) -> Result<(), CliError> {
    let mut provider = Provider::default();
    if command.configure {
        let config = ProviderConfig::load_without_cli_args()?;
        provider.configure(&config)?;
    }
    info!(configured = provider.is_configured(), "serving requests on stdin");
    serve(
        &mut provider,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_schema_renders_the_catalog() {
        let mut buf = Vec::new();

        write_schema(&mut buf, &Provider::default()).expect("schema renders");

        let rendered: serde_json::Value =
            serde_json::from_slice(&buf).expect("rendered schema is json");
        assert!(rendered.pointer("/resources/pnap_ip_block").is_some());
        assert!(rendered.pointer("/data_sources/pnap_invoices").is_some());
    }

    #[test]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        let err = CliError::Provider(ProviderError::NotConfigured);
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(
            rendered.contains("provider error: provider is not configured"),
            "rendered: {rendered}"
        );
    }
}
