//! `pnap_public_network`: routed networks backed by IP blocks.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ip_block::wait_for_ip_block;
use super::private_network::{
    MembershipState, membership_status, memberships_attribute, release_waiter,
};
use crate::api::PnapClient;
use crate::api::networks::{
    PublicNetwork, PublicNetworkCreate, PublicNetworkIpBlock, PublicNetworkIpBlockRef,
    PublicNetworkModify,
};
use crate::provider::{HandlerFuture, ProviderError, ResourceHandler};
use crate::schema::{Attribute, Schema, ValueType};
use crate::state::{block, non_empty};
use crate::wait::WaitSettings;

/// IP block assigned to the network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicNetworkIpBlockState {
    /// IP block identifier.
    pub id: String,
    /// CIDR of the block.
    pub cidr: String,
    /// Number of addresses in use.
    pub used_ips_count: String,
}

/// One entry of `ip_blocks`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct IpBlockEntry {
    /// Attached IP block.
    #[serde(with = "block")]
    pub public_network_ip_block: Option<PublicNetworkIpBlockState>,
}

impl IpBlockEntry {
    /// Entry referencing an IP block by id.
    #[must_use]
    pub fn with_id(id: &str) -> Self {
        Self {
            public_network_ip_block: Some(PublicNetworkIpBlockState {
                id: id.to_owned(),
                ..PublicNetworkIpBlockState::default()
            }),
        }
    }

    fn id(&self) -> Option<&str> {
        self.public_network_ip_block
            .as_ref()
            .map(|assigned| assigned.id.as_str())
    }
}

impl From<PublicNetworkIpBlock> for IpBlockEntry {
    fn from(assigned: PublicNetworkIpBlock) -> Self {
        Self {
            public_network_ip_block: Some(PublicNetworkIpBlockState {
                id: assigned.id,
                cidr: assigned.cidr,
                used_ips_count: assigned.used_ips_count,
            }),
        }
    }
}

fn ip_block_ids(entries: &[IpBlockEntry]) -> Vec<&str> {
    entries.iter().filter_map(IpBlockEntry::id).collect()
}

/// Overlays the reported IP blocks onto the configured ones by id. With no
/// configured blocks every reported block is listed.
pub(crate) fn merge_ip_blocks(
    mut configured: Vec<IpBlockEntry>,
    reported: Vec<PublicNetworkIpBlock>,
) -> Vec<IpBlockEntry> {
    if configured.is_empty() {
        return reported.into_iter().map(Into::into).collect();
    }
    for entry in configured
        .iter_mut()
        .filter_map(|entry| entry.public_network_ip_block.as_mut())
    {
        if let Some(found) = reported.iter().find(|assigned| assigned.id == entry.id) {
            if !found.cidr.is_empty() {
                entry.cidr.clone_from(&found.cidr);
            }
            if !found.used_ips_count.is_empty() {
                entry.used_ips_count.clone_from(&found.used_ips_count);
            }
        }
    }
    configured
}

/// State of a public network.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicNetworkState {
    /// Identifier.
    pub id: String,
    /// Name.
    pub name: String,
    /// Location code such as `PHX`.
    pub location: String,
    /// Free-form description.
    pub description: String,
    /// Attached IP blocks.
    pub ip_blocks: Vec<IpBlockEntry>,
    /// Creation timestamp.
    pub created_on: String,
    /// VLAN identifier.
    pub vlan_id: i64,
    /// Resources attached to the network.
    pub memberships: Vec<MembershipState>,
    /// Provisioning status.
    pub status: String,
    /// Whether router advertisement is enabled.
    pub ra_enabled: Option<bool>,
    /// Bypass soft validations when changing IP blocks.
    pub force: bool,
}

impl PublicNetworkState {
    fn flatten(network: PublicNetwork, configured: Vec<IpBlockEntry>, force: bool) -> Self {
        Self {
            id: network.id,
            name: network.name,
            location: network.location,
            description: network.description.unwrap_or_default(),
            ip_blocks: merge_ip_blocks(configured, network.ip_blocks),
            created_on: network.created_on,
            vlan_id: network.vlan_id,
            memberships: network.memberships.into_iter().map(Into::into).collect(),
            status: network.status,
            ra_enabled: network.ra_enabled,
            force,
        }
    }
}

/// Handler for `pnap_public_network`.
#[derive(Clone, Copy, Debug)]
pub struct PublicNetworkResource {
    network_wait: WaitSettings,
    ip_block_wait: WaitSettings,
}

impl PublicNetworkResource {
    /// Creates the handler with the membership release and IP block
    /// assignment cadences.
    #[must_use]
    pub const fn new(network_wait: WaitSettings, ip_block_wait: WaitSettings) -> Self {
        Self {
            network_wait,
            ip_block_wait,
        }
    }

    async fn refresh(
        client: &PnapClient,
        id: &str,
        configured: Vec<IpBlockEntry>,
        force: bool,
    ) -> Result<PublicNetworkState, ProviderError> {
        let network = client.get_public_network(id).await?;
        Ok(PublicNetworkState::flatten(network, configured, force))
    }

    /// Adds blocks new to the plan, then removes blocks it dropped. Each
    /// change waits for the block to settle.
    async fn sync_ip_blocks(
        &self,
        client: &PnapClient,
        network_id: &str,
        prior: &[IpBlockEntry],
        plan: &[IpBlockEntry],
        force: bool,
    ) -> Result<(), ProviderError> {
        let before = ip_block_ids(prior);
        let after = ip_block_ids(plan);
        for added in after.iter().filter(|id| !before.contains(*id)) {
            debug!(network = network_id, ip_block = added, "assigning ip block");
            client.add_public_network_ip_block(network_id, added).await?;
            wait_for_ip_block(client, added, self.ip_block_wait).await?;
        }
        for removed in before.iter().filter(|id| !after.contains(*id)) {
            debug!(network = network_id, ip_block = removed, "removing ip block");
            client
                .remove_public_network_ip_block(network_id, removed, force)
                .await?;
            wait_for_ip_block(client, removed, self.ip_block_wait).await?;
        }
        Ok(())
    }
}

impl ResourceHandler for PublicNetworkResource {
    type State = PublicNetworkState;

    const TYPE_NAME: &'static str = "pnap_public_network";

    fn schema(&self) -> Schema {
        let assigned = Schema::new()
            .attr("id", Attribute::required(ValueType::String))
            .attr("cidr", Attribute::computed(ValueType::String))
            .attr("used_ips_count", Attribute::computed(ValueType::String));
        let entry = Schema::new().attr(
            "public_network_ip_block",
            Attribute::optional_computed(ValueType::block(assigned)),
        );
        Schema::new()
            .attr("name", Attribute::required(ValueType::String))
            .attr("location", Attribute::required(ValueType::String))
            .attr("description", Attribute::optional(ValueType::String))
            .attr(
                "ip_blocks",
                Attribute::optional_computed(ValueType::blocks(entry)),
            )
            .attr("created_on", Attribute::computed(ValueType::String))
            .attr("vlan_id", Attribute::optional_computed(ValueType::Int))
            .attr("memberships", memberships_attribute())
            .attr("status", Attribute::computed(ValueType::String))
            .attr("ra_enabled", Attribute::optional_computed(ValueType::Bool))
            .attr("force", Attribute::optional(ValueType::Bool))
    }

    fn create<'a>(
        &'a self,
        client: &'a PnapClient,
        plan: PublicNetworkState,
    ) -> HandlerFuture<'a, PublicNetworkState> {
        Box::pin(async move {
            let request = PublicNetworkCreate {
                name: plan.name,
                location: plan.location,
                description: non_empty(&plan.description),
                vlan_id: (plan.vlan_id > 0).then_some(plan.vlan_id),
                ip_blocks: ip_block_ids(&plan.ip_blocks)
                    .into_iter()
                    .map(|id| PublicNetworkIpBlockRef { id: id.to_owned() })
                    .collect(),
                ra_enabled: plan.ra_enabled,
            };
            let created = client.create_public_network(&request).await?;
            info!(resource = Self::TYPE_NAME, id = %created.id, "public network created");
            Self::refresh(client, &created.id, plan.ip_blocks, plan.force).await
        })
    }

    fn read<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: PublicNetworkState,
    ) -> HandlerFuture<'a, PublicNetworkState> {
        Box::pin(async move {
            Self::refresh(client, &prior.id, prior.ip_blocks, prior.force).await
        })
    }

    fn update<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: PublicNetworkState,
        plan: PublicNetworkState,
    ) -> HandlerFuture<'a, PublicNetworkState> {
        Box::pin(async move {
            if ip_block_ids(&plan.ip_blocks) != ip_block_ids(&prior.ip_blocks) {
                self.sync_ip_blocks(
                    client,
                    &prior.id,
                    &prior.ip_blocks,
                    &plan.ip_blocks,
                    plan.force,
                )
                .await?;
            } else if plan.name != prior.name || plan.description != prior.description {
                let patch = PublicNetworkModify {
                    name: Some(plan.name.clone()),
                    description: Some(plan.description.clone()),
                    ra_enabled: None,
                };
                client.patch_public_network(&prior.id, &patch).await?;
            } else if plan.ra_enabled != prior.ra_enabled {
                let patch = PublicNetworkModify {
                    ra_enabled: Some(plan.ra_enabled.unwrap_or_default()),
                    ..PublicNetworkModify::default()
                };
                client.patch_public_network(&prior.id, &patch).await?;
            } else if plan.force != prior.force {
                debug!(
                    resource = Self::TYPE_NAME,
                    id = %prior.id,
                    "force changed; nothing to send"
                );
            } else {
                return Err(ProviderError::UnsupportedAction);
            }
            Self::refresh(client, &prior.id, plan.ip_blocks, plan.force).await
        })
    }

    fn delete<'a>(
        &'a self,
        client: &'a PnapClient,
        prior: PublicNetworkState,
    ) -> HandlerFuture<'a, ()> {
        Box::pin(async move {
            let id = prior.id.as_str();
            release_waiter(self.network_wait)
                .wait(move || async move {
                    client
                        .get_public_network(id)
                        .await
                        .map(|network| membership_status(&network.memberships))
                })
                .await
                .map_err(ProviderError::wait(format!(
                    "error waiting for public network ({id}) to be unassigned"
                )))?;
            client.delete_public_network(id).await?;
            info!(resource = Self::TYPE_NAME, id, "public network deleted");
            Ok(())
        })
    }
}
