//! `pnap_private_network`: layer 2 networks between servers in a location.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::PnapClient;
use crate::api::networks::{
    NetworkMembership, PrivateNetwork, PrivateNetworkCreate, PrivateNetworkModify,
    PrivateNetworkServer,
};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::non_empty;
use crate::wait::{StateWaiter, WaitSettings};

/// Resource attached to a network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MembershipState {
    /// Attached resource.
    pub resource_id: String,
    /// Kind of the attached resource.
    pub resource_type: String,
    /// Assigned addresses.
    pub ips: Vec<String>,
}

impl From<NetworkMembership> for MembershipState {
    fn from(member: NetworkMembership) -> Self {
        Self {
            resource_id: member.resource_id,
            resource_type: member.resource_type,
            ips: member.ips,
        }
    }
}

/// Server attached to a private network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkServerState {
    /// Server identifier.
    pub id: String,
    /// Assigned addresses.
    pub ips: Vec<String>,
}

impl From<PrivateNetworkServer> for NetworkServerState {
    fn from(server: PrivateNetworkServer) -> Self {
        Self {
            id: server.id,
            ips: server.ips,
        }
    }
}

/// Schema of `memberships`, shared by private and public networks.
pub(crate) fn memberships_attribute() -> Attribute {
    Attribute::computed(ValueType::blocks(
        Schema::new()
            .attr("resource_id", Attribute::computed(ValueType::String))
            .attr("resource_type", Attribute::computed(ValueType::String))
            .attr("ips", Attribute::computed(ValueType::string_list())),
    ))
}

/// Schema of the deprecated `servers` list.
pub(crate) fn servers_attribute() -> Attribute {
    Attribute::computed(ValueType::blocks(
        Schema::new()
            .attr("id", Attribute::computed(ValueType::String))
            .attr("ips", Attribute::computed(ValueType::string_list())),
    ))
}

/// Pseudo status used while waiting for a network to lose its members.
pub(crate) fn membership_status(memberships: &[NetworkMembership]) -> String {
    if memberships.is_empty() {
        String::from("unassigned")
    } else {
        String::from("assigned")
    }
}

/// Waiter for networks to become free of members.
pub(crate) const fn release_waiter(settings: WaitSettings) -> StateWaiter {
    StateWaiter::new(&["assigned"], &["unassigned"], settings)
}

/// State of a private network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrivateNetworkState {
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
    /// Bypass soft validations on create.
    pub force: bool,
    /// Servers on the network.
    pub servers: Vec<NetworkServerState>,
    /// Resources attached to the network.
    pub memberships: Vec<MembershipState>,
    /// Provisioning status.
    pub status: String,
    /// Creation timestamp.
    pub created_on: String,
}

impl PrivateNetworkState {
    fn flatten(network: PrivateNetwork, force: bool) -> Self {
        Self {
            id: network.id,
            name: network.name,
            location: network.location,
            description: network.description.unwrap_or_default(),
            location_default: network.location_default,
            cidr: network.cidr,
            network_type: network.network_type,
            vlan_id: network.vlan_id,
            force,
            servers: network.servers.into_iter().map(Into::into).collect(),
            memberships: network.memberships.into_iter().map(Into::into).collect(),
            status: network.status,
            created_on: network.created_on,
        }
    }
}

/// Handler for `pnap_private_network`.
#[derive(Clone, Copy, Debug)]
pub struct PrivateNetworkResource {
    wait: WaitSettings,
}

impl PrivateNetworkResource {
    /// Creates the handler with the membership release cadence.
    #[must_use]
    pub const fn new(wait: WaitSettings) -> Self {
        Self { wait }
    }

    async fn refresh(
        client: &PnapClient,
        id: &str,
        force: bool,
    ) -> Result<PrivateNetworkState, ProviderError> {
        let network = client.get_private_network(id).await?;
        Ok(PrivateNetworkState::flatten(network, force))
    }
}

impl ResourceHandler for PrivateNetworkResource {
    type State = PrivateNetworkState;

    const TYPE_NAME: &'static str = "pnap_private_network";

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("name", Attribute::required(ValueType::String))
            .attr("location", Attribute::required(ValueType::String))
            .attr("description", Attribute::optional(ValueType::String))
            .attr("location_default", Attribute::optional_computed(ValueType::Bool))
            .attr("cidr", Attribute::optional_computed(ValueType::String))
            .attr("type", Attribute::computed(ValueType::String))
            .attr("vlan_id", Attribute::optional_computed(ValueType::Int))
            .attr("force", Attribute::optional(ValueType::Bool))
            .attr(
                "servers",
                servers_attribute().deprecated("use memberships instead"),
            )
            .attr("memberships", memberships_attribute())
            .attr("status", Attribute::computed(ValueType::String))
            .attr("created_on", Attribute::computed(ValueType::String))
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: PrivateNetworkState,
    ) -> HandlerFuture<'a, PrivateNetworkState> {
        Box::pin(async move {
            let request = PrivateNetworkCreate {
                name: plan.name,
                location: plan.location,
                location_default: plan.location_default,
                description: non_empty(&plan.description),
                cidr: plan.cidr,
                vlan_id: (plan.vlan_id > 0).then_some(plan.vlan_id),
            };
            let created = client.create_private_network(&request, plan.force).await?;
            info!(resource = Self::TYPE_NAME, id = %created.id, "private network created");
            Self::refresh(client, &created.id, plan.force).await
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: PrivateNetworkState,
    ) -> HandlerFuture<'a, PrivateNetworkState> {
        Box::pin(async move { Self::refresh(client, &prior.id, prior.force).await })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: PrivateNetworkState,
        plan: PrivateNetworkState,
    ) -> HandlerFuture<'a, PrivateNetworkState> {
        Box::pin(async move {
            let changed = plan.name != prior.name
                || plan.location_default != prior.location_default
                || plan.description != prior.description;
            if !changed {
                return Err(ProviderError::UnsupportedAction);
            }
            let request = PrivateNetworkModify {
                name: plan.name,
                description: plan.description,
                location_default: plan.location_default,
            };
            client.update_private_network(&prior.id, &request).await?;
            Self::refresh(client, &prior.id, plan.force).await
        })
    }

    fn delete<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: PrivateNetworkState,
    ) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            let id = prior.id.as_str();
            release_waiter(self.wait)
                .wait(move || async move {
                    client
                        .get_private_network(id)
                        .await
                        .map(|network| membership_status(&network.memberships))
                })
                .await
                .map_err(ProviderError::wait(format!(
                    "error waiting for private network ({id}) to be unassigned"
                )))?;
            client.delete_private_network(id).await?;
            info!(resource = Self::TYPE_NAME, id, "private network deleted");
            Ok(())
        })
    }
}
