//! Typed client for the phoenixNAP Bare Metal Cloud REST API.
//!
//! Each service module adds the request/response models for one API family
//! and the [`PnapClient`] methods that wrap its endpoints. All calls go
//! through a [`Transport`], which lets tests script responses without a
//! network.

pub mod audit;
pub mod billing;
pub mod bmc;
mod error;
mod http;
pub mod invoicing;
pub mod ips;
pub mod locations;
pub mod networks;
pub mod payments;
pub mod rancher;
pub mod storage;
pub mod tags;
#[cfg(test)]
mod tests;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use error::ApiError;
pub use http::{HttpTransport, HttpTransportSettings};

/// Future returned by transport operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// API family addressed by a request. Each maps to a base path below the
/// configured API host.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Service {
    /// Servers, ssh keys and quotas.
    Bmc,
    /// Private, public and BGP networking.
    Networks,
    /// IP blocks.
    Ips,
    /// Tag manager.
    Tags,
    /// Rancher solution clusters.
    Rancher,
    /// Reservations, products and availability.
    Billing,
    /// Invoices.
    Invoicing,
    /// Payment transactions.
    Payments,
    /// Audit events.
    Audit,
    /// Locations catalogue.
    Locations,
    /// Network storage.
    NetworkStorage,
}

impl Service {
    /// Base path of the service relative to the API host.
    #[must_use]
    pub const fn base_path(self) -> &'static str {
        match self {
            Self::Bmc => "bmc/v1",
            Self::Networks => "networks/v1",
            Self::Ips => "ips/v1",
            Self::Tags => "tag-manager/v1",
            Self::Rancher => "solutions/rancher/v1beta",
            Self::Billing => "billing/v1",
            Self::Invoicing => "invoicing/v1",
            Self::Payments => "payments/v1",
            Self::Audit => "audit/v1",
            Self::Locations => "location-api/v1",
            Self::NetworkStorage => "network-storage/v1",
        }
    }
}

/// HTTP verb used by a request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(verb)
    }
}

/// A single REST call, independent of the HTTP stack.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// Service the path is relative to.
    pub service: Service,
    /// HTTP verb.
    pub method: Method,
    /// Path below the service base path, without a leading slash.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a request without query or body.
    #[must_use]
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        Self {
            service,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Appends a query parameter when a value is present.
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(inner) => self.query(key, inner),
            None => self,
        }
    }

    /// Appends one query parameter per value, repeating the key.
    #[must_use]
    pub fn query_all(mut self, key: &str, values: &[String]) -> Self {
        for value in values {
            self.query.push((key.to_owned(), value.clone()));
        }
        self
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body cannot be serialised.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path including the service prefix, for logging and routing.
    #[must_use]
    pub fn full_path(&self) -> String {
        if self.path.is_empty() {
            return self.service.base_path().to_owned();
        }
        format!("{}/{}", self.service.base_path(), self.path)
    }
}

/// Raw response returned by a [`Transport`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Successful response carrying a JSON document.
    #[must_use]
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string().into_bytes(),
        }
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    fn into_result(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(ApiError::from)
    }
}

/// Delivers [`ApiRequest`]s to the API.
pub trait Transport: Send + Sync {
    /// Executes a request, returning the raw response. Non-success statuses
    /// are returned as responses, not errors.
    fn execute(&self, request: ApiRequest) -> ApiFuture<'_, ApiResponse>;
}

/// Handle used by every resource and data source to reach the API.
#[derive(Clone)]
pub struct PnapClient {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for PnapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PnapClient").finish_non_exhaustive()
    }
}

impl PnapClient {
    /// Wraps a transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        debug!(method = %request.method, path = %request.full_path(), "dispatching API request");
        self.transport.execute(request).await?.into_result()
    }

    /// Sends a request and decodes the JSON response.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        self.send(request).await?.decode()
    }

    /// Sends a request and discards the response body.
    pub(crate) async fn call_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    /// Sends a request and returns the raw response body.
    pub(crate) async fn call_bytes(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        self.send(request).await.map(|response| response.body)
    }
}
