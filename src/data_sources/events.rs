//! `pnap_events` data source: queries the audit log.

use serde::{Deserialize, Serialize};

use super::{positive, timestamp_filter};
use crate::api::PnapClient;
use crate::api::audit::{Event, EventQuery};
use crate::provider::{DataSourceHandler, HandlerFuture, ProviderError};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty, synthetic_id};

/// Principal behind an event.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserInfoState {
    /// Account that performed the request.
    pub account_id: String,
    /// OAuth client used for the request.
    pub client_id: String,
    /// Name of the calling user.
    pub username: String,
}

/// One audit event. A single configured entry filters results by `name`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventState {
    /// Event name.
    pub name: String,
    /// When the event happened.
    pub timestamp: String,
    /// Caller details.
    #[serde(with = "block")]
    pub user_info: Option<UserInfoState>,
}

impl From<Event> for EventState {
    fn from(event: Event) -> Self {
        Self {
            name: event.name.unwrap_or_default(),
            timestamp: event.timestamp,
            user_info: Some(UserInfoState {
                account_id: event.user_info.account_id,
                client_id: event.user_info.client_id.unwrap_or_default(),
                username: event.user_info.username,
            }),
        }
    }
}

/// Filters and results of an audit log query.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EventsState {
    /// Synthetic identifier.
    pub id: String,
    /// Lower bound of the time window (RFC 3339).
    pub from: String,
    /// Upper bound of the time window (RFC 3339).
    pub to: String,
    /// Maximum number of events.
    pub limit: i64,
    /// Sort order (`ASC` or `DESC`).
    pub order: String,
    /// Only events by this user.
    pub username: String,
    /// HTTP verb filter.
    pub verb: String,
    /// Request URI filter.
    pub uri: String,
    /// Matching events.
    pub events: Vec<EventState>,
}

impl EventsState {
    fn query(&self) -> Result<EventQuery, ProviderError> {
        Ok(EventQuery {
            from: timestamp_filter("from", &self.from)?,
            to: timestamp_filter("to", &self.to)?,
            limit: positive(self.limit),
            order: non_empty(&self.order),
            username: non_empty(&self.username),
            verb: non_empty(&self.verb),
            uri: non_empty(&self.uri),
        })
    }
}

/// Handler for the `pnap_events` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventsDataSource;

impl DataSourceHandler for EventsDataSource {
    type State = EventsState;

    const TYPE_NAME: &'static str = "pnap_events";

    fn schema(&self) -> Schema {
        let user_info = Schema::new()
            .attr("account_id", Attribute::computed(ValueType::String))
            .attr("client_id", Attribute::computed(ValueType::String))
            .attr("username", Attribute::computed(ValueType::String));
        let event = Schema::new()
            .attr("name", Attribute::optional(ValueType::String))
            .attr("timestamp", Attribute::computed(ValueType::String))
            .attr("user_info", Attribute::computed(ValueType::block(user_info)));
        Schema::new()
            .attr("from", Attribute::optional(ValueType::String))
            .attr("to", Attribute::optional(ValueType::String))
            .attr("limit", Attribute::optional(ValueType::Int))
            .attr("order", Attribute::optional(ValueType::String))
            .attr("username", Attribute::optional(ValueType::String))
            .attr("verb", Attribute::optional(ValueType::String))
            .attr("uri", Attribute::optional(ValueType::String))
            .attr("events", Attribute::optional_computed(ValueType::blocks(event)))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: EventsState,
    ) -> HandlerFuture<'a, EventsState> {
        Box::pin(async move {
            if config.events.len() > 1 {
                return Err(ProviderError::UnsupportedAction);
            }
            let found = client.list_events(&config.query()?).await?;
            let wanted = config.events.first().map(|filter| filter.name.as_str());
            let events = found
                .into_iter()
                .filter(|event| wanted.is_none_or(|name| event.name.as_deref() == Some(name)))
                .map(Into::into)
                .collect();
            Ok(EventsState {
                id: synthetic_id(),
                events,
                ..config
            })
        })
    }
}
