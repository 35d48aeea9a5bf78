//! Unit tests for credential resolution.

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[fixture]
fn empty_config() -> ProviderConfig {
    ProviderConfig {
        client_id: None,
        client_secret: None,
        config_file_path: None,
        token_url: None,
        api_base_url: None,
        user_agent: DEFAULT_USER_AGENT.to_owned(),
        request_timeout_secs: 30,
    }
}

fn write_credentials(contents: &str) -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("temp dir: {err}"));
    let path = Utf8PathBuf::from_path_buf(dir.path().join("config.yaml"))
        .unwrap_or_else(|path| panic!("non utf-8 temp path: {}", path.display()));
    std::fs::write(&path, contents).unwrap_or_else(|err| panic!("write credentials: {err}"));
    (dir, path)
}

#[rstest]
fn explicit_pair_uses_default_endpoints(empty_config: ProviderConfig) {
    let config = ProviderConfig {
        client_id: Some(String::from("id")),
        client_secret: Some(String::from("secret")),
        token_url: Some(String::from("https://auth.example/token")),
        ..empty_config
    };

    let settings = config
        .resolve_credentials()
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(settings.client_id, "id");
    assert_eq!(settings.token_url, DEFAULT_TOKEN_URL);
    assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(settings.timeout, Duration::from_secs(30));
}

#[rstest]
fn explicit_pair_honours_custom_endpoints_together(empty_config: ProviderConfig) {
    let config = ProviderConfig {
        client_id: Some(String::from("id")),
        client_secret: Some(String::from("secret")),
        token_url: Some(String::from("https://auth.example/token")),
        api_base_url: Some(String::from("https://api.example/")),
        ..empty_config
    };

    let settings = config
        .resolve_credentials()
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(settings.token_url, "https://auth.example/token");
    assert_eq!(settings.api_base_url, "https://api.example/");
}

#[rstest]
fn credentials_file_is_read_when_pair_is_incomplete(empty_config: ProviderConfig) {
    let (_dir, path) = write_credentials(
        "clientId: file-id\nclientSecret: file-secret\ntokenURL: https://auth.file/token\n",
    );
    let config = ProviderConfig {
        client_id: Some(String::from("ignored")),
        config_file_path: Some(path.to_string()),
        ..empty_config
    };

    let settings = config
        .resolve_credentials()
        .unwrap_or_else(|err| panic!("resolve: {err}"));

    assert_eq!(settings.client_id, "file-id");
    assert_eq!(settings.client_secret, "file-secret");
    assert_eq!(settings.token_url, "https://auth.file/token");
    assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
}

#[rstest]
fn credentials_file_without_secret_is_actionable(empty_config: ProviderConfig) {
    let (_dir, path) = write_credentials("clientId: file-id\n");
    let config = ProviderConfig {
        config_file_path: Some(path.to_string()),
        ..empty_config
    };

    let err = config.resolve_credentials().expect_err("secret missing");

    let ConfigError::MissingField(ref message) = err else {
        panic!("expected MissingField error, got {err:?}");
    };
    assert!(message.contains("PNAP_CLIENT_SECRET"), "{message}");
    assert!(message.contains("clientSecret"), "{message}");
    assert!(message.contains(path.as_str()), "{message}");
}

#[rstest]
fn malformed_yaml_reports_file_error(empty_config: ProviderConfig) {
    let (_dir, path) = write_credentials("clientId: [unterminated\n");
    let config = ProviderConfig {
        config_file_path: Some(path.to_string()),
        ..empty_config
    };

    let err = config.resolve_credentials().expect_err("bad yaml");

    assert!(matches!(err, ConfigError::File { path: ref reported, .. } if *reported == path));
}

#[rstest]
fn missing_file_reports_file_error(empty_config: ProviderConfig) {
    let dir = TempDir::new().unwrap_or_else(|err| panic!("temp dir: {err}"));
    let path = dir.path().join("absent.yaml");
    let config = ProviderConfig {
        config_file_path: Some(path.to_string_lossy().into_owned()),
        ..empty_config
    };

    let err = config.resolve_credentials().expect_err("file absent");

    assert!(matches!(err, ConfigError::File { .. }));
}

#[rstest]
fn provider_block_overrides_only_set_values(empty_config: ProviderConfig) {
    let loaded = ProviderConfig {
        client_id: Some(String::from("from-env")),
        client_secret: Some(String::from("env-secret")),
        ..empty_config
    };
    let block = ProviderBlock {
        client_id: Some(String::from("from-block")),
        request_timeout_secs: Some(5),
        ..ProviderBlock::default()
    };

    let merged = loaded.merged(block);

    assert_eq!(merged.client_id.as_deref(), Some("from-block"));
    assert_eq!(merged.client_secret.as_deref(), Some("env-secret"));
    assert_eq!(merged.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(merged.request_timeout(), Duration::from_secs(5));
}
