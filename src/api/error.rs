//! Error types for the phoenixNAP API client.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while talking to the phoenixNAP API.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// Raised when the API answers with a non-success status code.
    #[error("API Returned Code: {status}, Message: {message}, Validation Errors: {validation_errors:?}")]
    Status {
        /// HTTP status code returned by the API.
        status: u16,
        /// Message extracted from the error payload.
        message: String,
        /// Field level validation failures reported by the API.
        validation_errors: Vec<String>,
    },
    /// Raised when the requested record does not exist.
    #[error("resource not found: {message}")]
    NotFound {
        /// Message extracted from the error payload.
        message: String,
    },
    /// Raised when the request cannot be delivered.
    #[error("transport error: {message}")]
    Transport {
        /// Message describing the transport failure.
        message: String,
    },
    /// Raised when a response body cannot be decoded.
    #[error("failed to decode API response: {message}")]
    Decode {
        /// Decoder message.
        message: String,
    },
    /// Raised when the OAuth2 token exchange fails.
    #[error("authentication failed: {message}")]
    Auth {
        /// Message returned by the token endpoint.
        message: String,
    },
}

/// Error payload shape shared by every phoenixNAP service.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload {
    #[serde(default)]
    message: String,
    #[serde(default)]
    validation_errors: Vec<String>,
}

impl ApiError {
    /// Builds an error from a non-success status code and raw response body.
    ///
    /// Bodies that do not follow the `{message, validationErrors}` shape are
    /// surfaced verbatim as the message.
    #[must_use]
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let payload = serde_json::from_slice::<ErrorPayload>(body).unwrap_or_else(|_| {
            ErrorPayload {
                message: String::from_utf8_lossy(body).trim().to_owned(),
                validation_errors: Vec::new(),
            }
        });

        if status == 404 {
            return Self::NotFound {
                message: payload.message,
            };
        }

        Self::Status {
            status,
            message: payload.message,
            validation_errors: payload.validation_errors,
        }
    }

    /// Returns `true` when the error reports a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode {
            message: value.to_string(),
        }
    }
}
