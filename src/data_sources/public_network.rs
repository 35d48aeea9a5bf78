//! `pnap_public_network` data source: looks up a public network by id or
//! name.

use serde::{Deserialize, Serialize};

use super::key_matches;
use crate::api::PnapClient;
use crate::api::networks::PublicNetwork;
use crate::provider::{DataSourceHandler, HandlerFuture};
use crate::resources::private_network::{MembershipState, memberships_attribute};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::find_unique;

/// Identifier of an IP block assigned to the network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpBlockRefState {
    /// IP block identifier.
    pub id: String,
}

/// Public network as exposed by the data source.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicNetworkDataState {
    /// Identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Free-form description.
    pub description: String,
    /// Provisioning status.
    pub status: String,
    /// Attached IP blocks.
    pub ip_blocks: Vec<IpBlockRefState>,
    /// Creation timestamp.
    pub created_on: String,
    /// VLAN identifier.
    pub vlan_id: i64,
    /// Resources attached to the network.
    pub memberships: Vec<MembershipState>,
}

impl From<PublicNetwork> for PublicNetworkDataState {
    fn from(network: PublicNetwork) -> Self {
        Self {
            id: network.id,
            name: network.name,
            location: network.location,
            description: network.description.unwrap_or_default(),
            status: network.status,
            ip_blocks: network
                .ip_blocks
                .into_iter()
                .map(|block| IpBlockRefState { id: block.id })
                .collect(),
            created_on: network.created_on,
            vlan_id: network.vlan_id,
            memberships: network.memberships.into_iter().map(Into::into).collect(),
        }
    }
}

/// Handler for the `pnap_public_network` data source.
#[derive(Clone, Copy, Debug, Default)]
pub struct PublicNetworkDataSource;

impl DataSourceHandler for PublicNetworkDataSource {
    type State = PublicNetworkDataState;

    const TYPE_NAME: &'static str = "pnap_public_network";

    fn schema(&self) -> Schema {
        let ip_block = Schema::new().attr("id", Attribute::computed(ValueType::String));
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
            .attr("status", Attribute::computed(ValueType::String))
            .attr("ip_blocks", Attribute::computed(ValueType::blocks(ip_block)))
            .attr("created_on", Attribute::computed(ValueType::String))
            .attr("vlan_id", Attribute::computed(ValueType::Int))
            .attr("memberships", memberships_attribute())
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        config: PublicNetworkDataState,
    ) -> HandlerFuture<'a, PublicNetworkDataState> {
        Box::pin(async move {
            let networks = client.list_public_networks().await?;
            let found = find_unique(
                networks,
                |network| {
                    key_matches(&config.name, &network.name) || key_matches(&config.id, &network.id)
                },
                format!("public networks with name {}", config.name),
            )?;
            Ok(found.map_or_else(
                || PublicNetworkDataState {
                    id: String::new(),
                    ..config
                },
                PublicNetworkDataState::from,
            ))
        })
    }
}
