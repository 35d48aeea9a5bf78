//! `pnap_server` data source: looks up a server by id or hostname.

use serde::{Deserialize, Serialize};

use super::{DataTagState, data_tags_attribute, key_matches};
use crate::api::PnapClient;
use crate::api::bmc::Server;
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::find_unique;

/// Server summary exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerDataState {
    /// Server identifier.
    pub id: String,
    /// Server hostname.
    pub hostname: String,
    /// Status reported by the API.
    pub status: String,
    /// First public address, else the first private one.
    pub primary_ip_address: String,
    /// Private addresses.
    pub private_ip_addresses: Vec<String>,
    /// Public addresses.
    pub public_ip_addresses: Vec<String>,
    /// Operating system.
    pub os: String,
    /// Server type such as `s1.c1.small`.
    #[serde(rename = "type")]
    pub server_type: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Tags assigned to the server.
    pub tags: Vec<DataTagState>,
}

impl From<Server> for ServerDataState {
    fn from(server: Server) -> Self {
        Self {
            primary_ip_address: server
                .public_ip_addresses
                .first()
                .cloned()
                .unwrap_or_default(),
            id: server.id,
            hostname: server.hostname,
            status: server.status,
            private_ip_addresses: server.private_ip_addresses,
            public_ip_addresses: server.public_ip_addresses,
            os: server.os.unwrap_or_default(),
            server_type: server.server_type,
            location: server.location,
            tags: server.tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Handler for the `pnap_server` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerDataSource;

impl DataSourceHandler for ServerDataSource {
    type State = ServerDataState;

    const TYPE_NAME: &'static str = "pnap_server";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr(
                "id",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["hostname"]),
            )
            .attr(
                "hostname",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["id"]),
            )
            .attr("status", Attribute::computed(ValueType::String))
            .attr("primary_ip_address", Attribute::computed(ValueType::String))
            .attr("private_ip_addresses", Attribute::computed(ValueType::string_set()))
            .attr("public_ip_addresses", Attribute::computed(ValueType::string_set()))
            .attr("os", Attribute::computed(ValueType::String))
            .attr("type", Attribute::computed(ValueType::String))
            .attr("location", Attribute::computed(ValueType::String))
            .attr("tags", data_tags_attribute())
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: ServerDataState,
    ) -> HandlerFuture<'a, ServerDataState> {
        Box::pin(async move {
            let servers = client.list_servers().await?;
            let found = find_unique(
                servers,
                |server| {
                    key_matches(&config.hostname, &server.hostname)
                        || key_matches(&config.id, &server.id)
                },
                format!("devices found with hostname {}", config.hostname),
            )?;
            Ok(found.map_or_else(
                || ServerDataState {
                    id: String::new(),
                    ..config
                },
                ServerDataState::from,
            ))
        })
    }
}
