//! Audit log service.

use serde::Deserialize;

use super::{ApiError, ApiRequest, Method, PnapClient, Service};

/// Audit event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    /// Event name.
    pub name: Option<String>,
    /// When the event happened.
    pub timestamp: String,
    /// Caller details.
    pub user_info: UserInfo,
}

/// Principal that triggered an event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    /// Account that performed the request.
    pub account_id: String,
    /// OAuth client used for the request.
    pub client_id: Option<String>,
    /// Name of the calling user.
    pub username: String,
}

/// Event query filters. Dates are RFC 3339 strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Lower bound of the time window (RFC 3339).
    pub from: Option<String>,
    /// Upper bound of the time window (RFC 3339).
    pub to: Option<String>,
    /// Maximum number of events.
    pub limit: Option<i64>,
    /// Sort order (`ASC` or `DESC`).
    pub order: Option<String>,
    /// Only events by this user.
    pub username: Option<String>,
    /// HTTP verb filter.
    pub verb: Option<String>,
    /// Request URI filter.
    pub uri: Option<String>,
}

impl PnapClient {
    /// Queries the audit log.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    pub async fn list_events(&self, query: &EventQuery) -> Result<Vec<Event>, ApiError> {
        let call = ApiRequest::new(Service::Audit, Method::Get, "events")
            .query_opt("from", query.from.as_deref())
            .query_opt("to", query.to.as_deref())
            .query_opt("limit", query.limit)
            .query_opt("order", query.order.as_deref())
            .query_opt("username", query.username.as_deref())
            .query_opt("verb", query.verb.as_deref())
            .query_opt("uri", query.uri.as_deref());
        self.call(call).await
    }
}
