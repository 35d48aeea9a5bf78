//! `pnap_private_network` data source: looks up a private network by id or
//! name.

use serde::{Deserialize, Serialize};

use super::key_matches;
use crate::api::PnapClient;
use crate::api::networks::PrivateNetwork;
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::resources::private_network::{
    MembershipState, NetworkServerState, memberships_attribute, servers_attribute,
};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::find_unique;

/// Private network as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrivateNetworkDataState {
    /// Identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Free-form description.
    pub description: String,
    /// Whether this is the default network for its location.
    pub location_default: bool,
    /// CIDR notation of the range.
    pub cidr: String,
    /// Network type (`PRIVATE`).
    #[serde(rename = "type")]
    pub network_type: String,
    /// VLAN identifier.
    pub vlan_id: i64,
    /// Servers on the network.
    pub servers: Vec<NetworkServerState>,
    /// Resources attached to the network.
    pub memberships: Vec<MembershipState>,
    /// Provisioning status.
    pub status: String,
    /// Creation timestamp.
    pub created_on: String,
}

impl From<PrivateNetwork> for PrivateNetworkDataState {
    fn from(network: PrivateNetwork) -> Self {
        Self {
            id: network.id,
            name: network.name,
            location: network.location,
            description: network.description.unwrap_or_default(),
            location_default: network.location_default,
            cidr: network.cidr,
            network_type: network.network_type,
            vlan_id: network.vlan_id,
            servers: network.servers.into_iter().map(Into::into).collect(),
            memberships: network.memberships.into_iter().map(Into::into).collect(),
            status: network.status,
            created_on: network.created_on,
        }
    }
}

/// Handler for the `pnap_private_network` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrivateNetworkDataSource;

impl DataSourceHandler for PrivateNetworkDataSource {
    type State = PrivateNetworkDataState;

    const TYPE_NAME: &'static str = "pnap_private_network";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr(
                "id",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["name"]),
            )
            .attr(
                "name",
                Attribute::optional_computed(ValueType::String).conflicts_with(&["id"]),
            )
            .attr("location", Attribute::computed(ValueType::String))
            .attr("description", Attribute::computed(ValueType::String))
            .attr("location_default", Attribute::computed(ValueType::Bool))
            .attr("cidr", Attribute::computed(ValueType::String))
            .attr("type", Attribute::computed(ValueType::String))
            .attr("vlan_id", Attribute::computed(ValueType::Int))
            .attr(
                "servers",
                servers_attribute().deprecated("use memberships instead"),
            )
            .attr("memberships", memberships_attribute())
            .attr("status", Attribute::computed(ValueType::String))
            .attr("created_on", Attribute::computed(ValueType::String))
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: PrivateNetworkDataState,
    ) -> HandlerFuture<'a, PrivateNetworkDataState> {
        Box::pin(async move {
            let networks = client.list_private_networks().await?;
            let found = find_unique(
                networks,
                |network| {
                    key_matches(&config.name, &network.name) || key_matches(&config.id, &network.id)
                },
                format!("private networks with name {}", config.name),
            )?;
            Ok(found.map_or_else(
                || PrivateNetworkDataState {
                    id: String::new(),
                    ..config
                },
                PrivateNetworkDataState::from,
            ))
        })
    }
}
