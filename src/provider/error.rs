//! Errors surfaced to the host by lifecycle operations.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::schema::SchemaError;
use crate::wait::WaitError;

/// Errors raised by resources, data sources and the provider catalog.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// API failure, passed through unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Raised when a status wait fails.
    #[error("{context}: {source}")]
    Wait {
        /// Sentence naming the resource and the awaited transition.
        context: String,
        /// Underlying wait failure.
        #[source]
        source: WaitError,
    },
    /// Raised when an update touches attributes the API cannot change.
    #[error("unsupported action")]
    UnsupportedAction,
    /// Raised when a unique-key lookup matches more than one record.
    #[error("{message}")]
    Lookup {
        /// Description of the ambiguity.
        message: String,
    },
    /// Raised when an argument fails local validation or the API omits an
    /// identifier.
    #[error("{message}")]
    Invalid {
        /// Validation message.
        message: String,
    },
    /// Raised when state cannot be decoded into or encoded from its typed
    /// form.
    #[error("invalid state for {type_name}: {message}")]
    State {
        /// Resource or data source type.
        type_name: String,
        /// Decoder message.
        message: String,
    },
    /// Raised when the host names a type the provider does not register.
    #[error("unknown {kind} type '{type_name}'")]
    UnknownType {
        /// `resource` or `data source`.
        kind: &'static str,
        /// Requested type.
        type_name: String,
    },
    /// Raised when configuration violates the schema.
    #[error("{type_name}: {source}")]
    Schema {
        /// Resource or data source type.
        type_name: String,
        /// Violation.
        #[source]
        source: SchemaError,
    },
    /// Raised when a local file cannot be written.
    #[error("failed to write {path}: {message}")]
    Io {
        /// Target path.
        path: String,
        /// Underlying I/O message.
        message: String,
    },
    /// Raised when provider configuration is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Raised when lifecycle calls arrive before `configure`.
    #[error("provider is not configured")]
    NotConfigured,
    /// Raised when a step after a successful create call fails. The remote
    /// object exists, so `state` carries what is known about it.
    #[error("{source}")]
    Incomplete {
        /// State of the created object, including its identifier.
        state: Value,
        /// Failure that interrupted the operation.
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Wraps a wait failure with a sentence naming the resource.
    #[must_use]
    pub fn wait(context: impl Into<String>) -> impl FnOnce(WaitError) -> Self {
        let sentence: String = context.into();
        move |source| Self::Wait {
            context: sentence,
            source,
        }
    }

    /// Attaches the state of a partially created object.
    ///
    /// The error is returned unchanged when `state` cannot be encoded.
    #[must_use]
    pub fn with_state<S: Serialize>(self, state: &S) -> Self {
        let Ok(encoded) = serde_json::to_value(state) else {
            return self;
        };
        Self::Incomplete {
            state: encoded,
            source: Box::new(self),
        }
    }

    /// State carried by [`ProviderError::Incomplete`].
    #[must_use]
    pub const fn partial_state(&self) -> Option<&Value> {
        match self {
            Self::Incomplete { state, .. } => Some(state),
            _ => None,
        }
    }

    /// Builds an [`ProviderError::Invalid`] error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
