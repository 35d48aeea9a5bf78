//! reqwest-backed transport with OAuth2 client-credentials authentication.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ApiError, ApiFuture, ApiRequest, ApiResponse, Method, Transport};

/// Tokens are refreshed this long before the server-side expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpTransport`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpTransportSettings {
    /// OAuth2 client identifier.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Token endpoint for the client-credentials grant.
    pub token_url: String,
    /// API host, for example `https://api.phoenixnap.com/`.
    pub api_base_url: String,
    /// Value sent in the `User-Agent` header.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Transport that talks to the live API over HTTPS.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    settings: HttpTransportSettings,
    token: Mutex<Option<CachedToken>>,
}

impl HttpTransport {
    /// Builds a transport from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(settings: HttpTransportSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            settings,
            token: Mutex::new(None),
        })
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        let base = self.settings.api_base_url.trim_end_matches('/');
        format!("{base}/{}", request.full_path())
    }

    async fn bearer_token(&self) -> Result<String, ApiError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref().filter(|cached| Instant::now() < cached.refresh_at) {
            return Ok(cached.value.clone());
        }

        debug!(token_url = %self.settings.token_url, "requesting access token");
        let response = self
            .client
            .post(&self.settings.token_url)
            .header(USER_AGENT, &self.settings.user_agent)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|err| ApiError::Auth {
                message: err.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| ApiError::Auth {
            message: err.to_string(),
        })?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "token endpoint rejected credentials");
            return Err(ApiError::Auth {
                message: format!("token endpoint returned {}: {}", status.as_u16(), body.trim()),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|err| ApiError::Auth {
            message: err.to_string(),
        })?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(0));
        let refresh_at = Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN);
        *guard = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at,
        });
        Ok(token.access_token)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = self.bearer_token().await?;
        let url = self.url_for(&request);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(USER_AGENT, &self.settings.user_agent)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> ApiFuture<'_, ApiResponse> {
        Box::pin(self.send(request))
    }
}
