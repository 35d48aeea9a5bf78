//! JSON-lines request loop standing in for the host RPC.
//!
//! Each input line is one [`Request`]; each output line is either
//! `{"result": ...}` or `{"error": "..."}`. A create that fails after the
//! remote object exists adds `"state"` to the error line. Blank lines are
//! skipped and a malformed request produces an error line without ending
//! the session.


use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::{ProviderBlock, ProviderConfig};
use crate::provider::{Provider, ProviderError};

/// One host request.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Resolves credentials and builds the API client.
    Configure {
        /// Provider block; unset attributes fall back to the environment.
        #[serde(default)]
        config: ProviderBlock,
    },
    /// Exports every schema.
    Schema,
    /// Creates a resource.
    Create {
        /// Resource type.
        type_name: String,
        /// Planned configuration.
        plan: Value,
    },
    /// Refreshes a resource.
    Read {
        /// Resource type.
        type_name: String,
        /// Prior state.
        state: Value,
    },
    /// Applies a planned change.
    Update {
        /// Resource type.
        type_name: String,
        /// Prior state.
        prior: Value,
        /// Planned configuration.
        plan: Value,
    },
    /// Destroys a resource.
    Delete {
        /// Resource type.
        type_name: String,
        /// Prior state.
        state: Value,
    },
    /// Evaluates a data source.
    ReadDataSource {
        /// Data source type.
        type_name: String,
        /// Configured filters.
        config: Value,
    },
}

impl Request {
    /// Wire name of the operation, safe to log.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::Schema => "schema",
            Self::Create { .. } => "create",
            Self::Read { .. } => "read",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::ReadDataSource { .. } => "read_data_source",
        }
    }
}

/// Errors that end a serve session.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Raised when reading requests or writing responses fails.
    #[error("failed to exchange messages: {0}")]
    Io(#[from] std::io::Error),
    /// Raised when a response cannot be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

fn configure(provider: &mut Provider, block: ProviderBlock) -> Result<Value, ProviderError> {
    let loaded = ProviderConfig::load_without_cli_args()?;
    provider.configure(&loaded.merged(block))?;
    Ok(Value::Null)
}

fn catalog(provider: &Provider) -> Result<Value, ProviderError> {
    serde_json::to_value(provider.schemas()).map_err(|err| ProviderError::State {
        type_name: String::from("catalog"),
        message: err.to_string(),
    })
}

/// Executes one request against `provider`.
///
/// # Errors
///
/// Returns the [`ProviderError`] raised by the addressed operation.
pub async fn dispatch(provider: &mut Provider, request: Request) -> Result<Value, ProviderError> {
    match request {
        Request::Configure { config } => configure(provider, config),
        Request::Schema => catalog(provider),
        Request::Create { type_name, plan } => provider.create(&type_name, plan).await,
        Request::Read { type_name, state } => provider.read(&type_name, state).await,
        Request::Update {
            type_name,
            prior,
            plan,
        } => provider.update(&type_name, prior, plan).await,
        Request::Delete { type_name, state } => provider
            .delete(&type_name, state)
            .await
            .map(|()| Value::Null),
        Request::ReadDataSource { type_name, config } => {
            provider.read_data_source(&type_name, config).await
        }
    }
}

async fn respond(provider: &mut Provider, line: &str) -> Value {
    let request: Request = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "malformed request");
            return json!({ "error": format!("malformed request: {err}") });
        }
    };
    debug!(op = request.op(), "dispatching request");
    dispatch(provider, request).await.map_or_else(
        |err| failure(&err),
        |result| json!({ "result": result }),
    )
}

/// Error line; a partially created object is reported alongside the error
/// so the host can keep tracking it.
fn failure(err: &ProviderError) -> Value {
    err.partial_state().map_or_else(
        || json!({ "error": err.to_string() }),
        |state| json!({ "error": err.to_string(), "state": state }),
    )
}

/// Answers requests from `input` until it is exhausted.
///
/// # Errors
///
/// Returns [`ServeError`] when the streams fail. Operation failures are
/// reported in-band and never end the session.
pub async fn serve<R, W>(provider: &mut Provider, input: R, mut output: W) -> Result<(), ServeError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = respond(provider, &line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
    }
    Ok(())
}
