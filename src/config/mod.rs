//! Provider configuration loading via `ortho-config`.
//!
//! Credentials resolve in three steps: explicit client id and secret, then
//! an explicit YAML credentials file, then `$HOME/.pnap/config.yaml`.

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::api::HttpTransportSettings;

/// Token endpoint used unless both custom endpoints are configured.
pub const DEFAULT_TOKEN_URL: &str =
    "https://auth.phoenixnap.com/auth/realms/BMC/protocol/openid-connect/token";
/// API host used unless both custom endpoints are configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.phoenixnap.com/";
/// User agent reported on every request.
pub const DEFAULT_USER_AGENT: &str = "terraform-provider-pnap/0.29.0";

/// Provider settings derived from defaults, configuration files,
/// environment variables and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "PNAP")]
pub struct ProviderConfig {
    /// OAuth2 client identifier.
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    pub client_secret: Option<String>,
    /// YAML credentials file consulted when no client pair is set.
    pub config_file_path: Option<String>,
    /// Custom token endpoint. Only honoured together with `api_base_url`.
    pub token_url: Option<String>,
    /// Custom API host. Only honoured together with `token_url`.
    pub api_base_url: Option<String>,
    /// User agent header value.
    #[ortho_config(default = DEFAULT_USER_AGENT.to_owned())]
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error
/// messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    yaml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, yaml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            yaml_key,
        }
    }
}

const CLIENT_ID: FieldMetadata = FieldMetadata::new("client ID", "PNAP_CLIENT_ID", "clientId");
const CLIENT_SECRET: FieldMetadata =
    FieldMetadata::new("client secret", "PNAP_CLIENT_SECRET", "clientSecret");

/// Shape of the YAML credentials file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CredentialsFile {
    #[serde(rename = "clientId")]
    client_id: String,
    #[serde(rename = "clientSecret")]
    client_secret: String,
    #[serde(rename = "tokenURL")]
    token_url: String,
    #[serde(rename = "apiHostName")]
    api_host_name: String,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|text| !text.trim().is_empty())
}

impl ProviderConfig {
    fn require_field(
        value: &str,
        metadata: &FieldMetadata,
        path: &Utf8Path,
    ) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to {}",
                metadata.description, metadata.env_var, metadata.yaml_key, path
            )));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("pnap-provider")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolves the credentials and endpoints used by the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] when the credentials file cannot be
    /// read or parsed, and [`ConfigError::MissingField`] when it lacks the
    /// client pair.
    pub fn resolve_credentials(&self) -> Result<HttpTransportSettings, ConfigError> {
        if let (Some(client_id), Some(client_secret)) = (
            non_blank(self.client_id.as_ref()),
            non_blank(self.client_secret.as_ref()),
        ) {
            let (token_url, api_base_url) = match (
                non_blank(self.token_url.as_ref()),
                non_blank(self.api_base_url.as_ref()),
            ) {
                (Some(token), Some(base)) => (token, base),
                _ => (DEFAULT_TOKEN_URL, DEFAULT_API_BASE_URL),
            };
            debug!("using client credentials from provider configuration");
            return Ok(self.settings(client_id, client_secret, token_url, api_base_url));
        }

        let path = match non_blank(self.config_file_path.as_ref()) {
            Some(explicit) => Utf8PathBuf::from(explicit),
            None => default_credentials_path()?,
        };
        debug!(path = %path, "reading credentials file");
        let file = read_credentials_file(&path)?;
        Self::require_field(&file.client_id, &CLIENT_ID, &path)?;
        Self::require_field(&file.client_secret, &CLIENT_SECRET, &path)?;

        let token_url = non_blank(Some(&file.token_url)).unwrap_or(DEFAULT_TOKEN_URL);
        let api_base_url = non_blank(Some(&file.api_host_name)).unwrap_or(DEFAULT_API_BASE_URL);
        Ok(self.settings(&file.client_id, &file.client_secret, token_url, api_base_url))
    }

    fn settings(
        &self,
        client_id: &str,
        client_secret: &str,
        token_url: &str,
        api_base_url: &str,
    ) -> HttpTransportSettings {
        HttpTransportSettings {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            token_url: token_url.to_owned(),
            api_base_url: api_base_url.to_owned(),
            user_agent: self.user_agent.clone(),
            timeout: self.request_timeout(),
        }
    }
}

/// Provider block attributes sent by the host. Values that are set replace
/// the ones loaded from the environment and configuration files.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderBlock {
    /// OAuth2 client identifier.
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    pub client_secret: Option<String>,
    /// YAML credentials file.
    pub config_file_path: Option<String>,
    /// Custom token endpoint.
    pub token_url: Option<String>,
    /// Custom API host.
    pub api_base_url: Option<String>,
    /// User agent header value.
    pub user_agent: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Overlays the attributes set in `block`.
    #[must_use]
    pub fn merged(self, block: ProviderBlock) -> Self {
        Self {
            client_id: block.client_id.or(self.client_id),
            client_secret: block.client_secret.or(self.client_secret),
            config_file_path: block.config_file_path.or(self.config_file_path),
            token_url: block.token_url.or(self.token_url),
            api_base_url: block.api_base_url.or(self.api_base_url),
            user_agent: block.user_agent.unwrap_or(self.user_agent),
            request_timeout_secs: block
                .request_timeout_secs
                .unwrap_or(self.request_timeout_secs),
        }
    }
}

fn default_credentials_path() -> Result<Utf8PathBuf, ConfigError> {
    let home = std::env::var("HOME").map_err(|_| {
        ConfigError::MissingField(String::from(
            "missing credentials: set PNAP_CLIENT_ID and PNAP_CLIENT_SECRET, \
             PNAP_CONFIG_FILE_PATH, or HOME so $HOME/.pnap/config.yaml can be found",
        ))
    })?;
    Ok(Utf8PathBuf::from(home).join(".pnap").join("config.yaml"))
}

fn read_credentials_file(path: &Utf8Path) -> Result<CredentialsFile, ConfigError> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| ConfigError::File {
        path: path.to_path_buf(),
        message: String::from("credentials path is missing a filename"),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| ConfigError::File {
        path: parent.to_path_buf(),
        message: err.to_string(),
    })?;
    let contents = dir.read_to_string(file_name).map_err(|err| ConfigError::File {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    if contents.trim().is_empty() {
        return Ok(CredentialsFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|err| ConfigError::File {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// Raised when the credentials file cannot be read or parsed.
    #[error("failed to load credentials from {path}: {message}")]
    File {
        /// Credentials file path.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
